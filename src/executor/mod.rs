//! The executor stack and per-invocation handlers
//!
//! `SimpleExecutor` drives a statement handler against the transaction's
//! connection. `CachingExecutor` decorates any executor with the
//! second-level cache. `InterceptedExecutor` routes every call through the
//! interceptor chain. The configuration factory composes them so decoration
//! is always uniform: chain(caching(simple)).

mod caching;
mod parameter;
mod result_set;
mod simple;
mod statement;

pub use caching::CachingExecutor;
pub use parameter::{DefaultParameterHandler, InterceptedParameterHandler, ParameterHandler};
pub use result_set::{DefaultResultSetHandler, InterceptedResultSetHandler, ResultSetHandler};
pub use simple::{InterceptedExecutor, SimpleExecutor};
pub use statement::{InterceptedStatementHandler, PreparedStatementHandler, StatementHandler};

use crate::error::Result;
use crate::mapping::MappedStatement;
use crate::types::{Params, RowSet};
use std::sync::Arc;

/// Executes mapped statements inside one logical session/transaction.
///
/// An executor belongs to exactly one session and must not be shared across
/// concurrent callers.
pub trait Executor {
    /// Executes a SELECT statement and returns the decoded rows.
    fn query(&mut self, ms: Arc<MappedStatement>, params: &Params) -> Result<Arc<RowSet>>;

    /// Executes an INSERT/UPDATE/DELETE statement and returns the
    /// affected-row count.
    fn update(&mut self, ms: Arc<MappedStatement>, params: &Params) -> Result<usize>;

    /// Commits the transaction when `required` or when writes are pending.
    fn commit(&mut self, required: bool) -> Result<()>;

    /// Rolls the transaction back when `required` or when writes are pending.
    fn rollback(&mut self, required: bool) -> Result<()>;

    /// Releases the connection; the executor is unusable afterwards.
    fn close(&mut self) -> Result<()>;
}
