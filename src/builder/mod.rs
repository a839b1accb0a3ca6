//! Declarative binding loader: JSON mapper manifests into the registry
//!
//! The execution core is agnostic to how bindings are discovered; this
//! loader is one producer of `MappedStatement` records: a manifest file (or
//! string) listing each mapper namespace, its cache opt-in and its
//! statements. Loading happens once at startup, before any execution.
//!
//! ```json
//! {
//!   "mappers": [
//!     {
//!       "namespace": "UserMapper",
//!       "cache": true,
//!       "statements": [
//!         {
//!           "name": "getAll",
//!           "sql": "select * from user",
//!           "command": "select",
//!           "result_type": "User",
//!           "many": true
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::config::Configuration;
use crate::error::Result;
use crate::mapping::{MappedStatement, SqlCommandType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level manifest: a list of mapper namespaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperManifest {
    pub mappers: Vec<MapperDef>,
}

/// One mapper namespace and its statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperDef {
    pub namespace: String,
    /// Opt this namespace's statements into the second-level cache.
    #[serde(default)]
    pub cache: bool,
    pub statements: Vec<StatementDef>,
}

/// One declared statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementDef {
    pub name: String,
    pub sql: String,
    pub command: SqlCommandType,
    #[serde(default)]
    pub result_type: Option<String>,
    /// True when the declared return shape is a collection.
    #[serde(default)]
    pub many: bool,
}

impl MapperManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Registers every statement of every mapper into the configuration,
    /// ids formed as `namespace.name`.
    pub fn register(&self, configuration: &mut Configuration) -> Result<()> {
        for mapper in &self.mappers {
            for statement in &mapper.statements {
                let mut builder = MappedStatement::builder()
                    .id(format!("{}.{}", mapper.namespace, statement.name))
                    .sql(statement.sql.as_str())
                    .command_type(statement.command)
                    .select_many(statement.many)
                    .use_cache(mapper.cache);
                if let Some(result_type) = &statement.result_type {
                    builder = builder.result_type(result_type.as_str());
                }
                configuration.add_mapped_statement(builder)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapperError;
    use std::io::Write;

    const MANIFEST: &str = r#"{
        "mappers": [
            {
                "namespace": "UserMapper",
                "cache": true,
                "statements": [
                    {
                        "name": "getAll",
                        "sql": "select * from user",
                        "command": "select",
                        "result_type": "User",
                        "many": true
                    },
                    {
                        "name": "insert",
                        "sql": "insert into user (name, age) values (#{name}, #{age})",
                        "command": "insert"
                    }
                ]
            },
            {
                "namespace": "OrderMapper",
                "statements": [
                    {
                        "name": "count",
                        "sql": "select count(*) as total from orders",
                        "command": "select"
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn manifest_registers_statements() {
        let manifest = MapperManifest::from_json(MANIFEST).unwrap();
        let mut config = Configuration::new();
        manifest.register(&mut config).unwrap();

        let get_all = config.mapped_statement("UserMapper.getAll").unwrap();
        assert_eq!(get_all.sql(), "select * from user");
        assert_eq!(get_all.command_type(), SqlCommandType::Select);
        assert_eq!(get_all.result_type(), "User");
        assert!(get_all.select_many());
        assert!(get_all.cache().is_some());

        let insert = config.mapped_statement("UserMapper.insert").unwrap();
        assert_eq!(insert.command_type(), SqlCommandType::Insert);
        // Same namespace, same cache instance.
        assert!(std::sync::Arc::ptr_eq(
            get_all.cache().unwrap(),
            insert.cache().unwrap()
        ));

        // Cache not requested for this namespace.
        let count = config.mapped_statement("OrderMapper.count").unwrap();
        assert!(count.cache().is_none());
    }

    #[test]
    fn manifest_loads_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappers.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();

        let manifest = MapperManifest::from_file(&path).unwrap();
        assert_eq!(manifest.mappers.len(), 2);
    }

    #[test]
    fn malformed_manifest_is_a_serialization_error() {
        assert!(matches!(
            MapperManifest::from_json("{ not json"),
            Err(MapperError::Serialization(_))
        ));
    }

    #[test]
    fn unknown_command_kind_is_rejected() {
        let json = r#"{
            "mappers": [{
                "namespace": "X",
                "statements": [{"name": "a", "sql": "truncate x", "command": "truncate"}]
            }]
        }"#;
        assert!(matches!(
            MapperManifest::from_json(json),
            Err(MapperError::Serialization(_))
        ));
    }
}
