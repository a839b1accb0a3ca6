//! Mapped statements: one declarative binding from id to SQL template

use crate::cache::Cache;
use crate::error::{MapperError, Result};
use crate::mapping::BoundSql;
use crate::types::Params;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Determines query-vs-update dispatch and cache read-vs-invalidate behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlCommandType {
    Select,
    Insert,
    Update,
    Delete,
}

impl SqlCommandType {
    pub fn is_query(&self) -> bool {
        matches!(self, SqlCommandType::Select)
    }
}

impl fmt::Display for SqlCommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlCommandType::Select => "SELECT",
            SqlCommandType::Insert => "INSERT",
            SqlCommandType::Update => "UPDATE",
            SqlCommandType::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// One declared mapping: statement id, SQL template, command kind, result
/// shape, and an optional cache handle.
///
/// Identity is `namespace.method`. Instances are created once at startup,
/// owned by the configuration registry, and read-only thereafter, safe for
/// concurrent reads without locking.
pub struct MappedStatement {
    id: String,
    sql: String,
    command_type: SqlCommandType,
    result_type: String,
    select_many: bool,
    use_cache: bool,
    cache: Option<Arc<dyn Cache>>,
}

impl MappedStatement {
    pub fn builder() -> MappedStatementBuilder {
        MappedStatementBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn command_type(&self) -> SqlCommandType {
        self.command_type
    }

    /// Declared result element type name; diagnostic only.
    pub fn result_type(&self) -> &str {
        &self.result_type
    }

    /// True when the declared return shape is a collection.
    pub fn select_many(&self) -> bool {
        self.select_many
    }

    /// Whether this statement asked for second-level caching.
    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    /// The namespace cache, if one was assigned at registration.
    pub fn cache(&self) -> Option<&Arc<dyn Cache>> {
        self.cache.as_ref()
    }

    /// Grouping key: everything before the last `.` of the id.
    pub fn namespace(&self) -> &str {
        match self.id.rfind('.') {
            Some(pos) => &self.id[..pos],
            None => &self.id,
        }
    }

    /// Builds the per-invocation SQL + ordered parameter names.
    pub fn bound_sql(&self) -> Result<BoundSql> {
        BoundSql::build(&self.sql)
    }

    /// Deterministic cache key for this statement and parameter value.
    ///
    /// Equal-by-value parameters produce identical keys regardless of object
    /// identity; cache correctness depends on it.
    pub fn cache_key(&self, params: &Params) -> String {
        format!("{}:{}", self.id, params.canonical())
    }

    pub(crate) fn assign_cache(&mut self, cache: Arc<dyn Cache>) {
        self.cache = Some(cache);
    }
}

impl fmt::Debug for MappedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedStatement")
            .field("id", &self.id)
            .field("command_type", &self.command_type)
            .field("result_type", &self.result_type)
            .field("select_many", &self.select_many)
            .field("use_cache", &self.use_cache)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

/// Builder for `MappedStatement`; `id` and `sql` are required
#[derive(Default)]
pub struct MappedStatementBuilder {
    id: Option<String>,
    sql: Option<String>,
    command_type: Option<SqlCommandType>,
    result_type: Option<String>,
    select_many: bool,
    use_cache: bool,
}

impl MappedStatementBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    pub fn command_type(mut self, command_type: SqlCommandType) -> Self {
        self.command_type = Some(command_type);
        self
    }

    pub fn result_type(mut self, result_type: impl Into<String>) -> Self {
        self.result_type = Some(result_type.into());
        self
    }

    pub fn select_many(mut self, select_many: bool) -> Self {
        self.select_many = select_many;
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn build(self) -> Result<MappedStatement> {
        let id = self
            .id
            .ok_or_else(|| MapperError::Configuration("mapped statement without id".to_string()))?;
        let sql = self.sql.ok_or_else(|| {
            MapperError::Configuration(format!("mapped statement '{}' without sql", id))
        })?;
        Ok(MappedStatement {
            id,
            sql,
            command_type: self.command_type.unwrap_or(SqlCommandType::Select),
            result_type: self.result_type.unwrap_or_default(),
            select_many: self.select_many,
            use_cache: self.use_cache,
            cache: None,
        })
    }
}
