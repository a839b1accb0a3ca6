//! Session facade: the public surface over the executor stack
//!
//! A session resolves statement ids, delegates to the outermost (possibly
//! intercepted, possibly cache-decorated) executor obtained from the
//! configuration factory, and enforces result cardinality. One session
//! belongs to one caller; it is not shared across threads.

use crate::config::Configuration;
use crate::error::{MapperError, Result};
use crate::executor::Executor;
use crate::transaction::Transaction;
use crate::types::{FromRow, Params};
use std::sync::Arc;

/// Opens sessions over one shared configuration
#[derive(Clone)]
pub struct SqlSessionFactory {
    configuration: Arc<Configuration>,
}

impl SqlSessionFactory {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration: Arc::new(configuration),
        }
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    /// Opens a session on a fresh connection from the data source.
    pub fn open_session(&self) -> Result<SqlSession> {
        let executor = self.configuration.new_executor()?;
        Ok(SqlSession {
            configuration: Arc::clone(&self.configuration),
            executor,
        })
    }

    /// Opens a session over a caller-supplied transaction.
    pub fn open_session_with(&self, transaction: Box<dyn Transaction>) -> Result<SqlSession> {
        let executor = self.configuration.new_executor_with(transaction)?;
        Ok(SqlSession {
            configuration: Arc::clone(&self.configuration),
            executor,
        })
    }
}

/// One logical session: statement execution plus transaction control
pub struct SqlSession {
    configuration: Arc<Configuration>,
    executor: Box<dyn Executor>,
}

impl SqlSession {
    /// Runs a SELECT statement and decodes every row.
    pub fn select_list<T: FromRow>(&mut self, statement_id: &str, params: &Params) -> Result<Vec<T>> {
        let ms = self.configuration.mapped_statement(statement_id)?;
        let rows = self.executor.query(ms, params)?;
        rows.iter().map(T::from_row).collect()
    }

    /// Runs a SELECT statement expected to yield at most one row.
    ///
    /// More than one row is a distinct too-many-results error, never
    /// silently truncated; zero rows is `None`.
    pub fn select_one<T: FromRow>(
        &mut self,
        statement_id: &str,
        params: &Params,
    ) -> Result<Option<T>> {
        let ms = self.configuration.mapped_statement(statement_id)?;
        let rows = self.executor.query(ms, params)?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(T::from_row(&rows[0])?)),
            n => Err(MapperError::TooManyResults(n)),
        }
    }

    /// Runs an INSERT statement, returning the affected-row count.
    pub fn insert(&mut self, statement_id: &str, params: &Params) -> Result<usize> {
        self.run_update(statement_id, params)
    }

    /// Runs an UPDATE statement, returning the affected-row count.
    pub fn update(&mut self, statement_id: &str, params: &Params) -> Result<usize> {
        self.run_update(statement_id, params)
    }

    /// Runs a DELETE statement, returning the affected-row count.
    pub fn delete(&mut self, statement_id: &str, params: &Params) -> Result<usize> {
        self.run_update(statement_id, params)
    }

    fn run_update(&mut self, statement_id: &str, params: &Params) -> Result<usize> {
        let ms = self.configuration.mapped_statement(statement_id)?;
        self.executor.update(ms, params)
    }

    pub fn commit(&mut self) -> Result<()> {
        self.executor.commit(false)
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.executor.rollback(false)
    }

    pub fn close(&mut self) -> Result<()> {
        self.executor.close()
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }
}
