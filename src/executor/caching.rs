//! Caching executor: second-level cache decoration over any executor

use crate::error::Result;
use crate::executor::Executor;
use crate::mapping::MappedStatement;
use crate::types::{Params, RowSet};
use std::sync::Arc;
use tracing::trace;

/// Decorates an executor with the namespace cache.
///
/// Statements without an assigned cache delegate unconditionally; caching is
/// opt-in per namespace. On a hit the stored rows are returned without
/// touching the delegate or the database. Any update clears the whole
/// namespace cache before delegating: invalidation is namespace-wide and
/// coarse, never per-key.
pub struct CachingExecutor {
    delegate: Box<dyn Executor>,
}

impl CachingExecutor {
    pub fn new(delegate: Box<dyn Executor>) -> Self {
        Self { delegate }
    }
}

impl Executor for CachingExecutor {
    fn query(&mut self, ms: Arc<MappedStatement>, params: &Params) -> Result<Arc<RowSet>> {
        let cache = match ms.cache() {
            Some(cache) => Arc::clone(cache),
            None => return self.delegate.query(ms, params),
        };

        let key = ms.cache_key(params);
        if let Some(rows) = cache.get(&key) {
            trace!(statement = ms.id(), key = key.as_str(), "second-level cache hit");
            return Ok(rows);
        }
        let rows = self.delegate.query(ms, params)?;
        cache.put(key, Arc::clone(&rows));
        Ok(rows)
    }

    fn update(&mut self, ms: Arc<MappedStatement>, params: &Params) -> Result<usize> {
        if let Some(cache) = ms.cache() {
            trace!(statement = ms.id(), namespace = ms.namespace(), "clearing namespace cache");
            cache.clear();
        }
        self.delegate.update(ms, params)
    }

    fn commit(&mut self, required: bool) -> Result<()> {
        self.delegate.commit(required)
    }

    fn rollback(&mut self, required: bool) -> Result<()> {
        self.delegate.rollback(required)
    }

    fn close(&mut self) -> Result<()> {
        self.delegate.close()
    }
}
