//! Simple executor: drives one statement handler per call, no caching

use crate::config::Configuration;
use crate::error::{MapperError, Result};
use crate::executor::Executor;
use crate::mapping::MappedStatement;
use crate::plugin::{Args, Outcome, Signature, TargetKind};
use crate::transaction::Transaction;
use crate::types::{Params, RowSet};
use std::sync::Arc;
use tracing::trace;

/// Executes statements directly against the transaction's connection.
///
/// No caching, no statement reuse across calls. Tracks pending writes so
/// `commit(false)`/`rollback(false)` only touch the transaction when there
/// is something to settle.
pub struct SimpleExecutor {
    configuration: Arc<Configuration>,
    transaction: Box<dyn Transaction>,
    dirty: bool,
    closed: bool,
}

impl SimpleExecutor {
    pub fn new(configuration: Arc<Configuration>, transaction: Box<dyn Transaction>) -> Self {
        Self {
            configuration,
            transaction,
            dirty: false,
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(MapperError::Executor("executor is closed".to_string()));
        }
        Ok(())
    }
}

impl Executor for SimpleExecutor {
    fn query(&mut self, ms: Arc<MappedStatement>, params: &Params) -> Result<Arc<RowSet>> {
        self.ensure_open()?;
        trace!(statement = ms.id(), "executing query");
        let handler = self
            .configuration
            .new_statement_handler(Arc::clone(&ms), params.clone())?;
        let connection = self.transaction.connection()?;
        let mut statement = handler.prepare(connection)?;
        handler.parameterize(statement.as_mut())?;
        let rows = handler.query(statement.as_mut())?;
        Ok(Arc::new(rows))
    }

    fn update(&mut self, ms: Arc<MappedStatement>, params: &Params) -> Result<usize> {
        self.ensure_open()?;
        trace!(statement = ms.id(), "executing update");
        let handler = self
            .configuration
            .new_statement_handler(Arc::clone(&ms), params.clone())?;
        let connection = self.transaction.connection()?;
        let mut statement = handler.prepare(connection)?;
        handler.parameterize(statement.as_mut())?;
        let affected = handler.update(statement.as_mut())?;
        self.dirty = true;
        Ok(affected)
    }

    fn commit(&mut self, required: bool) -> Result<()> {
        self.ensure_open()?;
        if required || self.dirty {
            self.transaction.commit()?;
            self.dirty = false;
        }
        Ok(())
    }

    fn rollback(&mut self, required: bool) -> Result<()> {
        self.ensure_open()?;
        if required || self.dirty {
            self.transaction.rollback()?;
            self.dirty = false;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.transaction.close()
    }
}

/// Decorator routing every executor call through the interceptor chain
pub struct InterceptedExecutor {
    configuration: Arc<Configuration>,
    inner: Box<dyn Executor>,
}

impl InterceptedExecutor {
    pub fn new(configuration: Arc<Configuration>, inner: Box<dyn Executor>) -> Self {
        Self {
            configuration,
            inner,
        }
    }
}

impl Executor for InterceptedExecutor {
    fn query(&mut self, ms: Arc<MappedStatement>, params: &Params) -> Result<Arc<RowSet>> {
        let configuration = Arc::clone(&self.configuration);
        let chain = configuration.interceptor_chain();
        let inner = &mut self.inner;
        let mut args = Args::Query {
            ms: ms.as_ref(),
            params,
        };
        chain
            .apply(
                Signature::new(TargetKind::Executor, "query"),
                &mut args,
                &mut |_| inner.query(Arc::clone(&ms), params).map(Outcome::Query),
            )?
            .into_query()
    }

    fn update(&mut self, ms: Arc<MappedStatement>, params: &Params) -> Result<usize> {
        let configuration = Arc::clone(&self.configuration);
        let chain = configuration.interceptor_chain();
        let inner = &mut self.inner;
        let mut args = Args::Update {
            ms: ms.as_ref(),
            params,
        };
        chain
            .apply(
                Signature::new(TargetKind::Executor, "update"),
                &mut args,
                &mut |_| inner.update(Arc::clone(&ms), params).map(Outcome::Affected),
            )?
            .into_affected()
    }

    fn commit(&mut self, required: bool) -> Result<()> {
        let configuration = Arc::clone(&self.configuration);
        let chain = configuration.interceptor_chain();
        let inner = &mut self.inner;
        let mut args = Args::Transaction { required };
        chain
            .apply(
                Signature::new(TargetKind::Executor, "commit"),
                &mut args,
                &mut |args| {
                    let Args::Transaction { required } = args else {
                        return Err(MapperError::Interceptor(
                            "commit arguments of unexpected shape".to_string(),
                        ));
                    };
                    inner.commit(*required).map(|_| Outcome::Done)
                },
            )?
            .into_done()
    }

    fn rollback(&mut self, required: bool) -> Result<()> {
        let configuration = Arc::clone(&self.configuration);
        let chain = configuration.interceptor_chain();
        let inner = &mut self.inner;
        let mut args = Args::Transaction { required };
        chain
            .apply(
                Signature::new(TargetKind::Executor, "rollback"),
                &mut args,
                &mut |args| {
                    let Args::Transaction { required } = args else {
                        return Err(MapperError::Interceptor(
                            "rollback arguments of unexpected shape".to_string(),
                        ));
                    };
                    inner.rollback(*required).map(|_| Outcome::Done)
                },
            )?
            .into_done()
    }

    fn close(&mut self) -> Result<()> {
        let configuration = Arc::clone(&self.configuration);
        let chain = configuration.interceptor_chain();
        let inner = &mut self.inner;
        let mut args = Args::Close;
        chain
            .apply(
                Signature::new(TargetKind::Executor, "close"),
                &mut args,
                &mut |_| inner.close().map(|_| Outcome::Done),
            )?
            .into_done()
    }
}
