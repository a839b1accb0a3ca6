//! Statement handlers: one request's prepare/parameterize/execute lifecycle

use crate::config::Configuration;
use crate::datasource::{Connection, PreparedStatement};
use crate::error::{MapperError, Result};
use crate::executor::{ParameterHandler, ResultSetHandler};
use crate::mapping::{BoundSql, MappedStatement};
use crate::plugin::{Args, Outcome, Signature, TargetKind};
use crate::types::{Params, RowSet};
use std::sync::Arc;

/// Owns one invocation: prepare, bind, execute, decode.
///
/// Handlers hold their bound SQL and mapped statement for exactly one
/// invocation and are never reused.
pub trait StatementHandler {
    fn bound_sql(&self) -> &BoundSql;

    fn mapped_statement(&self) -> &Arc<MappedStatement>;

    /// Compiles the bound SQL into a reusable statement handle.
    fn prepare(&self, connection: &mut dyn Connection) -> Result<Box<dyn PreparedStatement>>;

    /// Binds the parameter values into the handle's positional slots.
    fn parameterize(&self, statement: &mut dyn PreparedStatement) -> Result<()>;

    /// Executes a SELECT and decodes the rows.
    fn query(&self, statement: &mut dyn PreparedStatement) -> Result<RowSet>;

    /// Executes a write and returns the affected-row count.
    fn update(&self, statement: &mut dyn PreparedStatement) -> Result<usize>;
}

/// Default handler over prepared statements
pub struct PreparedStatementHandler {
    ms: Arc<MappedStatement>,
    params: Params,
    bound_sql: BoundSql,
    parameter_handler: Box<dyn ParameterHandler>,
    result_set_handler: Box<dyn ResultSetHandler>,
}

impl PreparedStatementHandler {
    pub fn new(
        configuration: &Arc<Configuration>,
        ms: Arc<MappedStatement>,
        params: Params,
    ) -> Result<Self> {
        let bound_sql = ms.bound_sql()?;
        Ok(Self {
            ms,
            params,
            bound_sql,
            parameter_handler: configuration.new_parameter_handler(),
            result_set_handler: configuration.new_result_set_handler(),
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl StatementHandler for PreparedStatementHandler {
    fn bound_sql(&self) -> &BoundSql {
        &self.bound_sql
    }

    fn mapped_statement(&self) -> &Arc<MappedStatement> {
        &self.ms
    }

    fn prepare(&self, connection: &mut dyn Connection) -> Result<Box<dyn PreparedStatement>> {
        connection.prepare(self.bound_sql.sql())
    }

    fn parameterize(&self, statement: &mut dyn PreparedStatement) -> Result<()> {
        self.parameter_handler
            .set_parameters(statement, self.bound_sql.param_names(), &self.params)
    }

    fn query(&self, statement: &mut dyn PreparedStatement) -> Result<RowSet> {
        if !self.ms.command_type().is_query() {
            return Err(MapperError::Statement(format!(
                "query dispatched on {} statement '{}'",
                self.ms.command_type(),
                self.ms.id()
            )));
        }
        let result_set = statement.execute_query()?;
        self.result_set_handler.handle_results(&self.ms, result_set)
    }

    fn update(&self, statement: &mut dyn PreparedStatement) -> Result<usize> {
        if self.ms.command_type().is_query() {
            return Err(MapperError::Statement(format!(
                "update dispatched on {} statement '{}'",
                self.ms.command_type(),
                self.ms.id()
            )));
        }
        statement.execute_update()
    }
}

/// Decorator routing every handler call through the interceptor chain
pub struct InterceptedStatementHandler {
    configuration: Arc<Configuration>,
    inner: PreparedStatementHandler,
}

impl InterceptedStatementHandler {
    pub fn new(configuration: Arc<Configuration>, inner: PreparedStatementHandler) -> Self {
        Self {
            configuration,
            inner,
        }
    }
}

impl StatementHandler for InterceptedStatementHandler {
    fn bound_sql(&self) -> &BoundSql {
        self.inner.bound_sql()
    }

    fn mapped_statement(&self) -> &Arc<MappedStatement> {
        self.inner.mapped_statement()
    }

    fn prepare(&self, connection: &mut dyn Connection) -> Result<Box<dyn PreparedStatement>> {
        let chain = self.configuration.interceptor_chain();
        // Interceptors may rewrite the SQL text before it reaches the driver.
        let mut sql = self.inner.bound_sql().sql().to_string();
        let ms = self.inner.mapped_statement();
        let mut args = Args::Prepare {
            ms: ms.as_ref(),
            sql: &mut sql,
        };
        chain
            .apply(
                Signature::new(TargetKind::StatementHandler, "prepare"),
                &mut args,
                &mut |args| {
                    let Args::Prepare { sql, .. } = args else {
                        return Err(MapperError::Interceptor(
                            "prepare arguments of unexpected shape".to_string(),
                        ));
                    };
                    connection.prepare(sql).map(Outcome::Statement)
                },
            )?
            .into_statement()
    }

    fn parameterize(&self, statement: &mut dyn PreparedStatement) -> Result<()> {
        let chain = self.configuration.interceptor_chain();
        let inner = &self.inner;
        let mut args = Args::Parameterize {
            names: inner.bound_sql().param_names(),
            params: inner.params(),
        };
        chain
            .apply(
                Signature::new(TargetKind::StatementHandler, "parameterize"),
                &mut args,
                &mut |_| inner.parameterize(statement).map(|_| Outcome::Done),
            )?
            .into_done()
    }

    fn query(&self, statement: &mut dyn PreparedStatement) -> Result<RowSet> {
        let chain = self.configuration.interceptor_chain();
        let inner = &self.inner;
        let mut args = Args::Execute {
            ms: inner.mapped_statement().as_ref(),
        };
        chain
            .apply(
                Signature::new(TargetKind::StatementHandler, "query"),
                &mut args,
                &mut |_| inner.query(statement).map(Outcome::Rows),
            )?
            .into_rows()
    }

    fn update(&self, statement: &mut dyn PreparedStatement) -> Result<usize> {
        let chain = self.configuration.interceptor_chain();
        let inner = &self.inner;
        let mut args = Args::Execute {
            ms: inner.mapped_statement().as_ref(),
        };
        chain
            .apply(
                Signature::new(TargetKind::StatementHandler, "update"),
                &mut args,
                &mut |_| inner.update(statement).map(Outcome::Affected),
            )?
            .into_affected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::datasource::{DataSource, StubDataSource};
    use crate::mapping::SqlCommandType;
    use crate::types::Value;

    fn configuration(ds: &StubDataSource) -> Arc<Configuration> {
        let mut config = Configuration::new();
        config.set_data_source(Arc::new(ds.clone()));
        config
            .add_mapped_statement(
                MappedStatement::builder()
                    .id("UserMapper.getAll")
                    .sql("select * from user")
                    .command_type(SqlCommandType::Select)
                    .select_many(true),
            )
            .unwrap();
        config
            .add_mapped_statement(
                MappedStatement::builder()
                    .id("UserMapper.delete")
                    .sql("delete from user where id = #{id}")
                    .command_type(SqlCommandType::Delete),
            )
            .unwrap();
        Arc::new(config)
    }

    #[test]
    fn full_lifecycle_for_a_select() {
        let ds = StubDataSource::new();
        // Default plugins include the LIMIT rewrite, so script the capped SQL.
        ds.on_query(
            "select * from user LIMIT 1000",
            &["id", "name"],
            vec![vec![Value::Integer(1), Value::Text("jvyou".into())]],
        );
        let config = configuration(&ds);
        let ms = config.mapped_statement("UserMapper.getAll").unwrap();

        let handler = config
            .new_statement_handler(ms, Params::None)
            .unwrap();
        let mut connection = ds.connection().unwrap();
        let mut statement = handler.prepare(connection.as_mut()).unwrap();
        handler.parameterize(statement.as_mut()).unwrap();
        let rows = handler.query(statement.as_mut()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], Value::Text("jvyou".into()));
    }

    #[test]
    fn query_on_a_write_statement_fails_fast() {
        let ds = StubDataSource::new();
        let config = configuration(&ds);
        let ms = config.mapped_statement("UserMapper.delete").unwrap();

        let handler = config
            .new_statement_handler(ms, Params::scalar(1))
            .unwrap();
        let mut connection = ds.connection().unwrap();
        let mut statement = handler.prepare(connection.as_mut()).unwrap();
        assert!(matches!(
            handler.query(statement.as_mut()),
            Err(MapperError::Statement(_))
        ));
    }

    #[test]
    fn update_on_a_select_statement_fails_fast() {
        let ds = StubDataSource::new();
        let config = configuration(&ds);
        let ms = config.mapped_statement("UserMapper.getAll").unwrap();

        let handler = config
            .new_statement_handler(ms, Params::None)
            .unwrap();
        let mut connection = ds.connection().unwrap();
        let mut statement = handler.prepare(connection.as_mut()).unwrap();
        assert!(matches!(
            handler.update(statement.as_mut()),
            Err(MapperError::Statement(_))
        ));
    }
}
