//! Result-set handlers: raw driver rows into decoded column maps

use crate::config::Configuration;
use crate::datasource::ResultSet;
use crate::error::{MapperError, Result};
use crate::mapping::MappedStatement;
use crate::plugin::{Args, Outcome, Signature, TargetKind};
use crate::types::{RowSet, SqlRow};
use std::sync::Arc;
use tracing::trace;

/// Maps an executed statement's raw rows into the result sequence.
///
/// Always returns a sequence: cardinality is policy at the session facade,
/// not here. Decoding failure for any row is fatal for the whole call.
pub trait ResultSetHandler {
    fn handle_results(&self, ms: &MappedStatement, result_set: ResultSet) -> Result<RowSet>;
}

/// Default handler: zip column names with row values
#[derive(Default)]
pub struct DefaultResultSetHandler;

impl DefaultResultSetHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ResultSetHandler for DefaultResultSetHandler {
    fn handle_results(&self, ms: &MappedStatement, result_set: ResultSet) -> Result<RowSet> {
        let ResultSet { columns, rows } = result_set;
        let mut out = RowSet::with_capacity(rows.len());
        for values in rows {
            if values.len() != columns.len() {
                return Err(MapperError::TypeError(format!(
                    "statement '{}': row has {} values for {} columns",
                    ms.id(),
                    values.len(),
                    columns.len()
                )));
            }
            let mut row = SqlRow::with_capacity(columns.len());
            for (column, value) in columns.iter().zip(values) {
                row.insert(column.clone(), value);
            }
            out.push(row);
        }
        if !ms.select_many() && out.len() > 1 {
            // Not an error here; the facade decides whether one-or-none was
            // the contract.
            trace!(statement = ms.id(), rows = out.len(), "single-result statement decoded multiple rows");
        }
        Ok(out)
    }
}

/// Decorator routing `handle_results` through the interceptor chain
pub struct InterceptedResultSetHandler {
    configuration: Arc<Configuration>,
    inner: DefaultResultSetHandler,
}

impl InterceptedResultSetHandler {
    pub fn new(configuration: Arc<Configuration>, inner: DefaultResultSetHandler) -> Self {
        Self {
            configuration,
            inner,
        }
    }
}

impl ResultSetHandler for InterceptedResultSetHandler {
    fn handle_results(&self, ms: &MappedStatement, result_set: ResultSet) -> Result<RowSet> {
        let chain = self.configuration.interceptor_chain();
        let inner = &self.inner;
        let mut result_set = result_set;
        let mut args = Args::HandleResults {
            ms,
            result_set: &mut result_set,
        };
        chain
            .apply(
                Signature::new(TargetKind::ResultSetHandler, "handle_results"),
                &mut args,
                &mut |args| {
                    let Args::HandleResults { ms, result_set } = args else {
                        return Err(MapperError::Interceptor(
                            "handle_results arguments of unexpected shape".to_string(),
                        ));
                    };
                    inner
                        .handle_results(ms, std::mem::take(*result_set))
                        .map(Outcome::Rows)
                },
            )?
            .into_rows()
    }
}
