//! Built-in plugin: logs every executor and statement-handler call

use crate::plugin::{Args, Interceptor, Invocation, Outcome, Signature, TargetKind};
use crate::error::Result;
use std::time::Instant;
use tracing::debug;

/// Observes the pipeline without mutating anything: statement id, SQL text
/// and elapsed time go to the `sqlmapper::sql` tracing target.
#[derive(Default)]
pub struct SqlLogPlugin;

impl SqlLogPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Interceptor for SqlLogPlugin {
    fn matches(&self, signature: Signature) -> bool {
        matches!(
            signature.target,
            TargetKind::Executor | TargetKind::StatementHandler
        )
    }

    fn around(&self, invocation: &mut Invocation<'_, '_>) -> Result<Outcome> {
        let signature = invocation.signature();
        match invocation.args() {
            Args::Query { ms, .. } | Args::Update { ms, .. } | Args::Execute { ms } => {
                debug!(target: "sqlmapper::sql", method = signature.method, statement = ms.id(), "==>");
            }
            Args::Prepare { ms, sql } => {
                debug!(target: "sqlmapper::sql", statement = ms.id(), sql = sql.as_str(), "==> preparing");
            }
            _ => {
                debug!(target: "sqlmapper::sql", method = signature.method, "==>");
            }
        }

        let started = Instant::now();
        let outcome = invocation.proceed();
        let elapsed = started.elapsed();

        match &outcome {
            Ok(Outcome::Query(rows)) => {
                debug!(target: "sqlmapper::sql", method = signature.method, rows = rows.len(), ?elapsed, "<==");
            }
            Ok(Outcome::Rows(rows)) => {
                debug!(target: "sqlmapper::sql", method = signature.method, rows = rows.len(), ?elapsed, "<==");
            }
            Ok(Outcome::Affected(count)) => {
                debug!(target: "sqlmapper::sql", method = signature.method, affected = count, ?elapsed, "<==");
            }
            Ok(_) => {
                debug!(target: "sqlmapper::sql", method = signature.method, ?elapsed, "<==");
            }
            Err(error) => {
                debug!(target: "sqlmapper::sql", method = signature.method, %error, ?elapsed, "<== failed");
            }
        }
        outcome
    }
}
