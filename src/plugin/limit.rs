//! Built-in plugin: caps SELECT row counts by rewriting the bound SQL

use crate::error::Result;
use crate::plugin::{Args, Interceptor, Invocation, Outcome, Signature, TargetKind};

const DEFAULT_MAX_ROWS: usize = 1000;

/// Appends `LIMIT n` to SELECT statements that do not already carry one.
///
/// A cross-cutting SQL-rewrite: the template text stays declarative, the cap
/// is applied where the statement is prepared.
pub struct LimitPlugin {
    max_rows: usize,
}

impl Default for LimitPlugin {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl LimitPlugin {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }
}

fn has_limit(sql: &str) -> bool {
    sql.to_ascii_lowercase()
        .split_whitespace()
        .any(|word| word == "limit")
}

impl Interceptor for LimitPlugin {
    fn matches(&self, signature: Signature) -> bool {
        signature == Signature::new(TargetKind::StatementHandler, "prepare")
    }

    fn around(&self, invocation: &mut Invocation<'_, '_>) -> Result<Outcome> {
        if let Args::Prepare { ms, sql } = invocation.args() {
            if ms.command_type().is_query() && !has_limit(sql) {
                sql.push_str(&format!(" LIMIT {}", self.max_rows));
            }
        }
        invocation.proceed()
    }
}
