//! Scripted in-memory driver
//!
//! Stands in for a real database driver in tests, doc examples and embedded
//! use without a backend. Responses are keyed by the exact SQL text handed
//! to `prepare`; execution counts and transaction calls are recorded so
//! callers can assert how often the backend was actually hit.

use crate::datasource::{Connection, DataSource, PreparedStatement, ResultSet};
use crate::error::{MapperError, Result};
use crate::types::Value;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Scripted {
    Rows(ResultSet),
    Affected(usize),
}

/// Counters of everything the driver was asked to do
#[derive(Debug, Default, Clone)]
pub struct DriverStats {
    /// Queries executed, per SQL text
    pub queries: AHashMap<String, usize>,
    /// Updates executed, per SQL text
    pub updates: AHashMap<String, usize>,
    pub commits: usize,
    pub rollbacks: usize,
    pub closes: usize,
}

impl DriverStats {
    pub fn query_count(&self, sql: &str) -> usize {
        self.queries.get(sql).copied().unwrap_or(0)
    }

    pub fn update_count(&self, sql: &str) -> usize {
        self.updates.get(sql).copied().unwrap_or(0)
    }

    pub fn total_queries(&self) -> usize {
        self.queries.values().sum()
    }
}

#[derive(Default)]
struct StubState {
    responses: AHashMap<String, Scripted>,
    stats: DriverStats,
    /// Last parameter bindings observed, per SQL text
    bindings: AHashMap<String, Vec<Option<Value>>>,
}

/// Data source whose every connection shares one scripted state
#[derive(Clone, Default)]
pub struct StubDataSource {
    state: Arc<RwLock<StubState>>,
}

impl StubDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the rows returned for `sql`.
    pub fn on_query(&self, sql: &str, columns: &[&str], rows: Vec<Vec<Value>>) {
        let result = ResultSet::new(columns.iter().map(|c| c.to_string()).collect(), rows);
        self.state
            .write()
            .responses
            .insert(sql.to_string(), Scripted::Rows(result));
    }

    /// Scripts the affected-row count returned for `sql`.
    pub fn on_update(&self, sql: &str, affected: usize) {
        self.state
            .write()
            .responses
            .insert(sql.to_string(), Scripted::Affected(affected));
    }

    pub fn stats(&self) -> DriverStats {
        self.state.read().stats.clone()
    }

    /// Parameter values bound on the most recent execution of `sql`.
    pub fn last_bindings(&self, sql: &str) -> Option<Vec<Option<Value>>> {
        self.state.read().bindings.get(sql).cloned()
    }
}

impl DataSource for StubDataSource {
    fn connection(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(StubConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct StubConnection {
    state: Arc<RwLock<StubState>>,
}

impl Connection for StubConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn PreparedStatement>> {
        Ok(Box::new(StubStatement {
            state: Arc::clone(&self.state),
            sql: sql.to_string(),
            bound: Vec::new(),
        }))
    }

    fn commit(&mut self) -> Result<()> {
        self.state.write().stats.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.state.write().stats.rollbacks += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.write().stats.closes += 1;
        Ok(())
    }
}

struct StubStatement {
    state: Arc<RwLock<StubState>>,
    sql: String,
    bound: Vec<Option<Value>>,
}

impl StubStatement {
    fn bind(&mut self, index: usize, value: Option<Value>) -> Result<()> {
        if self.bound.len() <= index {
            self.bound.resize(index + 1, None);
        }
        self.bound[index] = value;
        Ok(())
    }

    fn scripted(&self) -> Result<Scripted> {
        self.state
            .read()
            .responses
            .get(&self.sql)
            .cloned()
            .ok_or_else(|| MapperError::Backend(format!("no scripted response for: {}", self.sql)))
    }

    fn record_bindings(&self) {
        self.state
            .write()
            .bindings
            .insert(self.sql.clone(), self.bound.clone());
    }
}

impl PreparedStatement for StubStatement {
    fn set_integer(&mut self, index: usize, value: i64) -> Result<()> {
        self.bind(index, Some(Value::Integer(value)))
    }

    fn set_float(&mut self, index: usize, value: f64) -> Result<()> {
        self.bind(index, Some(Value::Float(value)))
    }

    fn set_text(&mut self, index: usize, value: &str) -> Result<()> {
        self.bind(index, Some(Value::Text(value.to_string())))
    }

    fn set_bool(&mut self, index: usize, value: bool) -> Result<()> {
        self.bind(index, Some(Value::Bool(value)))
    }

    fn set_null(&mut self, index: usize) -> Result<()> {
        self.bind(index, Some(Value::Null))
    }

    fn execute_query(&mut self) -> Result<ResultSet> {
        let scripted = self.scripted()?;
        self.record_bindings();
        let mut state = self.state.write();
        *state.stats.queries.entry(self.sql.clone()).or_insert(0) += 1;
        match scripted {
            Scripted::Rows(result) => Ok(result),
            Scripted::Affected(_) => Err(MapperError::Backend(format!(
                "statement is scripted as an update: {}",
                self.sql
            ))),
        }
    }

    fn execute_update(&mut self) -> Result<usize> {
        let scripted = self.scripted()?;
        self.record_bindings();
        let mut state = self.state.write();
        *state.stats.updates.entry(self.sql.clone()).or_insert(0) += 1;
        match scripted {
            Scripted::Affected(count) => Ok(count),
            Scripted::Rows(_) => Err(MapperError::Backend(format!(
                "statement is scripted as a query: {}",
                self.sql
            ))),
        }
    }
}
