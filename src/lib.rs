//! sqlmapper: lightweight SQL mapping engine
//!
//! Declarative statement mappings executed against a pluggable relational
//! backend: typed parameter binding, row materialization, method-level
//! interception and an opt-in second-level cache.
//!
//! ## Architecture
//! - Mapping layer: `MappedStatement` registry + `#{name}` template binding
//! - Execution layer: statement/parameter/result-set handlers driven by the
//!   executor stack (simple -> caching -> intercepted)
//! - Plugin layer: ordered interceptor chain wrapped around every capability
//! - Cache layer: per-namespace second-level cache, coarse invalidation
//! - Connectivity seam: `DataSource`/`Connection`/`PreparedStatement` traits
//!   supplied by a driver (a scripted in-memory stub ships for tests)
//!
//! ## Quick start
//! ```
//! use sqlmapper::{Configuration, MapperManifest, Params, SqlSessionFactory, StubDataSource, Value};
//! use std::sync::Arc;
//!
//! # fn main() -> sqlmapper::Result<()> {
//! let manifest = MapperManifest::from_json(r#"{
//!     "mappers": [{
//!         "namespace": "UserMapper",
//!         "cache": true,
//!         "statements": [
//!             {"name": "getAll", "sql": "select * from user", "command": "select", "many": true}
//!         ]
//!     }]
//! }"#)?;
//!
//! let driver = StubDataSource::new();
//! driver.on_query(
//!     "select * from user LIMIT 1000",
//!     &["id", "name"],
//!     vec![vec![Value::Integer(1), Value::Text("jvyou".into())]],
//! );
//!
//! let mut config = Configuration::new();
//! config.set_data_source(Arc::new(driver));
//! manifest.register(&mut config)?;
//!
//! let factory = SqlSessionFactory::new(config);
//! let mut session = factory.open_session()?;
//! let users: Vec<sqlmapper::SqlRow> = session.select_list("UserMapper.getAll", &Params::None)?;
//! assert_eq!(users.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cache;
pub mod datasource;
pub mod executor;
pub mod mapping;
pub mod plugin;
pub mod session;
pub mod transaction;
pub mod types;

mod config;
mod error;

pub use config::Configuration;
pub use error::{MapperError, Result};

// Primary public API
pub use builder::{MapperDef, MapperManifest, StatementDef};
pub use cache::{BoundedCache, Cache, PerpetualCache};
pub use datasource::{Connection, DataSource, PreparedStatement, ResultSet, StubDataSource};
pub use executor::Executor;
pub use mapping::{BoundSql, MappedStatement, SqlCommandType};
pub use plugin::{
    Args, Interceptor, InterceptorChain, Invocation, LimitPlugin, Outcome, Signature,
    SqlLogPlugin, TargetKind,
};
pub use session::{SqlSession, SqlSessionFactory};
pub use transaction::{ManagedTransaction, Transaction};
pub use types::{FromRow, Params, RowAccess, RowSet, SqlRow, Value};
