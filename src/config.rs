//! Core configuration: registries, plugins and component factories
//!
//! One `Configuration` owns everything process-wide: the statement registry
//! (populated at startup, read-only afterwards), the type-handler registry,
//! the interceptor chain, the lazily-memoized namespace caches and the data
//! source. Components never construct each other directly; they go through
//! the factory methods here, so interception and cache decoration are always
//! applied uniformly.

use crate::cache::{Cache, PerpetualCache};
use crate::datasource::DataSource;
use crate::error::{MapperError, Result};
use crate::executor::{
    CachingExecutor, DefaultParameterHandler, DefaultResultSetHandler, Executor,
    InterceptedExecutor, InterceptedParameterHandler, InterceptedResultSetHandler,
    InterceptedStatementHandler, ParameterHandler, PreparedStatementHandler, ResultSetHandler,
    SimpleExecutor, StatementHandler,
};
use crate::mapping::{MappedStatement, MappedStatementBuilder};
use crate::plugin::{Interceptor, InterceptorChain, LimitPlugin, SqlLogPlugin};
use crate::transaction::{ManagedTransaction, Transaction};
use crate::types::{Params, TypeHandlerRegistry};
use ahash::AHashMap;
use dashmap::DashMap;
use std::sync::Arc;

pub struct Configuration {
    /// Statement id -> mapping; read-mostly after startup
    mapped_statements: AHashMap<String, Arc<MappedStatement>>,
    type_handlers: TypeHandlerRegistry,
    interceptor_chain: InterceptorChain,
    /// Global second-level cache switch; per-statement opt-in still applies
    cache_enabled: bool,
    /// Namespace -> cache, created on first reference
    caches: DashMap<String, Arc<dyn Cache>>,
    data_source: Option<Arc<dyn DataSource>>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    /// Creates a configuration with the default type handlers and the two
    /// built-in plugins (SQL logging, SELECT row cap).
    pub fn new() -> Self {
        let mut interceptor_chain = InterceptorChain::new();
        interceptor_chain.add_interceptor(Arc::new(SqlLogPlugin::new()));
        interceptor_chain.add_interceptor(Arc::new(LimitPlugin::default()));

        Self {
            mapped_statements: AHashMap::new(),
            type_handlers: TypeHandlerRegistry::default(),
            interceptor_chain,
            cache_enabled: true,
            caches: DashMap::new(),
            data_source: None,
        }
    }

    /// Creates a configuration with no plugins and the default type handlers.
    pub fn bare() -> Self {
        Self {
            mapped_statements: AHashMap::new(),
            type_handlers: TypeHandlerRegistry::default(),
            interceptor_chain: InterceptorChain::new(),
            cache_enabled: true,
            caches: DashMap::new(),
            data_source: None,
        }
    }

    pub fn set_data_source(&mut self, data_source: Arc<dyn DataSource>) {
        self.data_source = Some(data_source);
    }

    pub fn data_source(&self) -> Result<&Arc<dyn DataSource>> {
        self.data_source
            .as_ref()
            .ok_or_else(|| MapperError::Configuration("no data source configured".to_string()))
    }

    /// Turns second-level caching off globally; statements registered while
    /// disabled get no cache handle.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptor_chain.add_interceptor(interceptor);
    }

    pub fn interceptor_chain(&self) -> &InterceptorChain {
        &self.interceptor_chain
    }

    pub fn type_handlers(&self) -> &TypeHandlerRegistry {
        &self.type_handlers
    }

    pub fn type_handlers_mut(&mut self) -> &mut TypeHandlerRegistry {
        &mut self.type_handlers
    }

    /// Registers a mapped statement; duplicate ids are a configuration error.
    ///
    /// Statements that opted into caching get their namespace cache assigned
    /// here, so every statement of a namespace shares one cache instance.
    pub fn add_mapped_statement(&mut self, builder: MappedStatementBuilder) -> Result<()> {
        let mut ms = builder.build()?;
        if self.mapped_statements.contains_key(ms.id()) {
            return Err(MapperError::Configuration(format!(
                "duplicate mapped statement '{}'",
                ms.id()
            )));
        }
        if self.cache_enabled && ms.use_cache() {
            let cache = self.cache(ms.namespace());
            ms.assign_cache(cache);
        }
        self.mapped_statements.insert(ms.id().to_string(), Arc::new(ms));
        Ok(())
    }

    /// Resolves a statement id; unresolved ids are fatal to the call.
    pub fn mapped_statement(&self, id: &str) -> Result<Arc<MappedStatement>> {
        self.mapped_statements
            .get(id)
            .cloned()
            .ok_or_else(|| MapperError::StatementNotFound(id.to_string()))
    }

    pub fn mapped_statement_ids(&self) -> Vec<String> {
        self.mapped_statements.keys().cloned().collect()
    }

    /// The cache for a namespace, created and memoized on first reference.
    pub fn cache(&self, namespace: &str) -> Arc<dyn Cache> {
        self.caches
            .entry(namespace.to_string())
            .or_insert_with(|| Arc::new(PerpetualCache::new(namespace)) as Arc<dyn Cache>)
            .clone()
    }

    /// Replaces the cache implementation for a namespace (e.g. a bounded
    /// one). Must run before statements of that namespace are registered.
    pub fn set_cache(&mut self, namespace: &str, cache: Arc<dyn Cache>) {
        self.caches.insert(namespace.to_string(), cache);
    }

    /// The outermost executor for one new session: interception over caching
    /// over simple execution.
    pub fn new_executor(self: &Arc<Self>) -> Result<Box<dyn Executor>> {
        let transaction = ManagedTransaction::open(self.data_source()?.as_ref())?;
        self.new_executor_with(Box::new(transaction))
    }

    /// Same stack over a caller-supplied transaction.
    pub fn new_executor_with(
        self: &Arc<Self>,
        transaction: Box<dyn Transaction>,
    ) -> Result<Box<dyn Executor>> {
        let simple = SimpleExecutor::new(Arc::clone(self), transaction);
        let caching = CachingExecutor::new(Box::new(simple));
        Ok(Box::new(InterceptedExecutor::new(
            Arc::clone(self),
            Box::new(caching),
        )))
    }

    /// A statement handler for one invocation, interception applied.
    pub fn new_statement_handler(
        self: &Arc<Self>,
        ms: Arc<MappedStatement>,
        params: Params,
    ) -> Result<Box<dyn StatementHandler>> {
        let inner = PreparedStatementHandler::new(self, ms, params)?;
        Ok(Box::new(InterceptedStatementHandler::new(
            Arc::clone(self),
            inner,
        )))
    }

    /// A parameter handler, interception applied.
    pub fn new_parameter_handler(self: &Arc<Self>) -> Box<dyn ParameterHandler> {
        let inner = DefaultParameterHandler::new(Arc::clone(self));
        Box::new(InterceptedParameterHandler::new(Arc::clone(self), inner))
    }

    /// A result-set handler, interception applied.
    pub fn new_result_set_handler(self: &Arc<Self>) -> Box<dyn ResultSetHandler> {
        Box::new(InterceptedResultSetHandler::new(
            Arc::clone(self),
            DefaultResultSetHandler::new(),
        ))
    }
}
