//! Method-level interception applied uniformly across the pipeline
//!
//! An interceptor declares which call sites it wants to observe through
//! `matches`; the chain folds every matching interceptor, in registration
//! order, around the real call. The first interceptor added is outermost.
//! Unmatched calls go straight to the target with nothing but one dispatch
//! in between. An interceptor may inspect or mutate the arguments, skip the
//! real call by returning its own outcome, or continue with `proceed()`.
//! An error from `around` aborts the whole call and surfaces to the caller.
//!
//! The pipeline wraps each capability (executor, statement handler,
//! parameter handler, result-set handler) in an explicit decorator that
//! routes its calls through the chain; no runtime code generation is
//! involved.

mod limit;
mod sql_log;

pub use limit::LimitPlugin;
pub use sql_log::SqlLogPlugin;

use crate::datasource::{PreparedStatement, ResultSet};
use crate::error::{MapperError, Result};
use crate::mapping::MappedStatement;
use crate::types::{Params, RowSet};
use std::sync::Arc;

/// The wrapped capability a call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Executor,
    StatementHandler,
    ParameterHandler,
    ResultSetHandler,
}

/// Identifies one interceptable call site: capability plus method name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub target: TargetKind,
    pub method: &'static str,
}

impl Signature {
    pub fn new(target: TargetKind, method: &'static str) -> Self {
        Self { target, method }
    }
}

/// The arguments of the intercepted call, mutable where rewriting is allowed
pub enum Args<'a> {
    /// Executor::query
    Query {
        ms: &'a MappedStatement,
        params: &'a Params,
    },
    /// Executor::update
    Update {
        ms: &'a MappedStatement,
        params: &'a Params,
    },
    /// Executor::commit / Executor::rollback
    Transaction { required: bool },
    /// Executor::close
    Close,
    /// StatementHandler::prepare; the SQL text may be rewritten in place
    Prepare {
        ms: &'a MappedStatement,
        sql: &'a mut String,
    },
    /// StatementHandler::parameterize and ParameterHandler::set_parameters
    Parameterize {
        names: &'a [String],
        params: &'a Params,
    },
    /// StatementHandler::query / StatementHandler::update
    Execute { ms: &'a MappedStatement },
    /// ResultSetHandler::handle_results
    HandleResults {
        ms: &'a MappedStatement,
        result_set: &'a mut ResultSet,
    },
}

/// What the intercepted call produced
pub enum Outcome {
    /// Executor-level query result, shared for caching
    Query(Arc<RowSet>),
    /// Handler-level decoded rows
    Rows(RowSet),
    /// Affected-row count
    Affected(usize),
    /// A prepared statement handle
    Statement(Box<dyn PreparedStatement>),
    /// Nothing
    Done,
}

fn mismatched(expected: &str) -> MapperError {
    MapperError::Interceptor(format!(
        "interceptor produced a mismatched outcome, expected {}",
        expected
    ))
}

impl Outcome {
    pub fn into_query(self) -> Result<Arc<RowSet>> {
        match self {
            Outcome::Query(rows) => Ok(rows),
            _ => Err(mismatched("query rows")),
        }
    }

    pub fn into_rows(self) -> Result<RowSet> {
        match self {
            Outcome::Rows(rows) => Ok(rows),
            _ => Err(mismatched("rows")),
        }
    }

    pub fn into_affected(self) -> Result<usize> {
        match self {
            Outcome::Affected(count) => Ok(count),
            _ => Err(mismatched("affected-row count")),
        }
    }

    pub fn into_statement(self) -> Result<Box<dyn PreparedStatement>> {
        match self {
            Outcome::Statement(statement) => Ok(statement),
            _ => Err(mismatched("statement handle")),
        }
    }

    pub fn into_done(self) -> Result<()> {
        match self {
            Outcome::Done => Ok(()),
            _ => Err(mismatched("unit")),
        }
    }
}

/// One intercepted call: the site, its arguments, and the continuation
pub struct Invocation<'i, 'b> {
    signature: Signature,
    args: &'i mut Args<'b>,
    proceed: &'i mut dyn FnMut(&mut Args<'b>) -> Result<Outcome>,
}

impl<'i, 'b> Invocation<'i, 'b> {
    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn args(&mut self) -> &mut Args<'b> {
        self.args
    }

    /// Continues to the next matching interceptor, or to the real target.
    pub fn proceed(&mut self) -> Result<Outcome> {
        (self.proceed)(self.args)
    }
}

/// Observes and optionally wraps matched calls.
///
/// Interceptors are stateless with respect to any one invocation; shared
/// state, if any, is process-wide and supplied by the caller.
pub trait Interceptor: Send + Sync {
    /// Whether this interceptor observes the given call site.
    fn matches(&self, signature: Signature) -> bool;

    /// Runs around the matched call; `invocation.proceed()` continues the
    /// chain. Returning without proceeding skips the real call.
    fn around(&self, invocation: &mut Invocation<'_, '_>) -> Result<Outcome>;
}

/// Ordered interceptor sequence; registration order is invocation order
#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor; the first added intercepts outermost.
    pub fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Runs `terminal` through every interceptor matching `signature`,
    /// preserving registration order. With no match the call passes straight
    /// through.
    pub fn apply<'b>(
        &self,
        signature: Signature,
        args: &mut Args<'b>,
        terminal: &mut dyn FnMut(&mut Args<'b>) -> Result<Outcome>,
    ) -> Result<Outcome> {
        let matched: Vec<&Arc<dyn Interceptor>> = self
            .interceptors
            .iter()
            .filter(|interceptor| interceptor.matches(signature))
            .collect();
        run(&matched, signature, args, terminal)
    }
}

fn run<'b>(
    stack: &[&Arc<dyn Interceptor>],
    signature: Signature,
    args: &mut Args<'b>,
    terminal: &mut dyn FnMut(&mut Args<'b>) -> Result<Outcome>,
) -> Result<Outcome> {
    match stack.split_first() {
        None => terminal(args),
        Some((first, rest)) => {
            let mut proceed =
                |inner: &mut Args<'b>| run(rest, signature, inner, terminal);
            let mut invocation = Invocation {
                signature,
                args,
                proceed: &mut proceed,
            };
            first.around(&mut invocation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::SqlCommandType;
    use parking_lot::Mutex;

    fn select_statement() -> MappedStatement {
        MappedStatement::builder()
            .id("UserMapper.getAll")
            .sql("select * from user")
            .command_type(SqlCommandType::Select)
            .select_many(true)
            .build()
            .unwrap()
    }

    struct Recording {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Interceptor for Recording {
        fn matches(&self, signature: Signature) -> bool {
            signature.target == TargetKind::Executor
        }

        fn around(&self, invocation: &mut Invocation<'_, '_>) -> Result<Outcome> {
            self.log.lock().push(format!("{}:enter", self.label));
            let outcome = invocation.proceed()?;
            self.log.lock().push(format!("{}:exit", self.label));
            Ok(outcome)
        }
    }

    #[test]
    fn chain_preserves_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = InterceptorChain::new();
        chain.add_interceptor(Arc::new(Recording {
            label: "first",
            log: Arc::clone(&log),
        }));
        chain.add_interceptor(Arc::new(Recording {
            label: "second",
            log: Arc::clone(&log),
        }));

        let ms = select_statement();
        let params = Params::None;
        let mut args = Args::Query {
            ms: &ms,
            params: &params,
        };
        let log_inner = Arc::clone(&log);
        chain
            .apply(
                Signature::new(TargetKind::Executor, "query"),
                &mut args,
                &mut |_| {
                    log_inner.lock().push("target".to_string());
                    Ok(Outcome::Query(Arc::new(Vec::new())))
                },
            )
            .unwrap()
            .into_query()
            .unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "first:enter",
                "second:enter",
                "target",
                "second:exit",
                "first:exit"
            ]
        );
    }

    #[test]
    fn unmatched_call_passes_straight_through() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = InterceptorChain::new();
        chain.add_interceptor(Arc::new(Recording {
            label: "executor-only",
            log: Arc::clone(&log),
        }));

        let mut args = Args::Close;
        let mut called = false;
        chain
            .apply(
                Signature::new(TargetKind::StatementHandler, "parameterize"),
                &mut args,
                &mut |_| {
                    called = true;
                    Ok(Outcome::Done)
                },
            )
            .unwrap()
            .into_done()
            .unwrap();

        assert!(called);
        assert!(log.lock().is_empty());
    }

    struct SqlRewriter;

    impl Interceptor for SqlRewriter {
        fn matches(&self, signature: Signature) -> bool {
            signature == Signature::new(TargetKind::StatementHandler, "prepare")
        }

        fn around(&self, invocation: &mut Invocation<'_, '_>) -> Result<Outcome> {
            if let Args::Prepare { sql, .. } = invocation.args() {
                sql.push_str(" /* traced */");
            }
            invocation.proceed()
        }
    }

    #[test]
    fn interceptor_can_mutate_arguments() {
        let mut chain = InterceptorChain::new();
        chain.add_interceptor(Arc::new(SqlRewriter));

        let ms = select_statement();
        let mut sql = "select * from user".to_string();
        let mut args = Args::Prepare { ms: &ms, sql: &mut sql };
        let mut seen = String::new();
        chain
            .apply(
                Signature::new(TargetKind::StatementHandler, "prepare"),
                &mut args,
                &mut |args| {
                    if let Args::Prepare { sql, .. } = args {
                        seen = sql.clone();
                    }
                    Ok(Outcome::Done)
                },
            )
            .unwrap();

        assert_eq!(seen, "select * from user /* traced */");
    }

    struct ShortCircuit;

    impl Interceptor for ShortCircuit {
        fn matches(&self, signature: Signature) -> bool {
            signature.method == "query"
        }

        fn around(&self, _invocation: &mut Invocation<'_, '_>) -> Result<Outcome> {
            Ok(Outcome::Query(Arc::new(Vec::new())))
        }
    }

    #[test]
    fn interceptor_can_skip_the_real_call() {
        let mut chain = InterceptorChain::new();
        chain.add_interceptor(Arc::new(ShortCircuit));

        let ms = select_statement();
        let params = Params::None;
        let mut args = Args::Query {
            ms: &ms,
            params: &params,
        };
        let mut called = false;
        let rows = chain
            .apply(
                Signature::new(TargetKind::Executor, "query"),
                &mut args,
                &mut |_| {
                    called = true;
                    Ok(Outcome::Query(Arc::new(Vec::new())))
                },
            )
            .unwrap()
            .into_query()
            .unwrap();

        assert!(!called);
        assert!(rows.is_empty());
    }

    struct Failing;

    impl Interceptor for Failing {
        fn matches(&self, _signature: Signature) -> bool {
            true
        }

        fn around(&self, _invocation: &mut Invocation<'_, '_>) -> Result<Outcome> {
            Err(MapperError::Interceptor("boom".to_string()))
        }
    }

    #[test]
    fn interceptor_error_aborts_the_call() {
        let mut chain = InterceptorChain::new();
        chain.add_interceptor(Arc::new(Failing));

        let mut args = Args::Close;
        let mut called = false;
        let result = chain.apply(
            Signature::new(TargetKind::Executor, "close"),
            &mut args,
            &mut |_| {
                called = true;
                Ok(Outcome::Done)
            },
        );

        assert!(matches!(result, Err(MapperError::Interceptor(_))));
        assert!(!called);
    }
}
