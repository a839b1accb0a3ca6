//! Parameter handlers: bind named values into positional statement slots

use crate::config::Configuration;
use crate::datasource::PreparedStatement;
use crate::error::{MapperError, Result};
use crate::plugin::{Args, Outcome, Signature, TargetKind};
use crate::types::Params;
use std::sync::Arc;

/// Binds ordered parameter names against a parameter value.
///
/// Purely synchronous; no side effects beyond the binding calls.
pub trait ParameterHandler {
    fn set_parameters(
        &self,
        statement: &mut dyn PreparedStatement,
        names: &[String],
        params: &Params,
    ) -> Result<()>;
}

/// Default handler: resolve each name, encode via the type-handler registry
pub struct DefaultParameterHandler {
    configuration: Arc<Configuration>,
}

impl DefaultParameterHandler {
    pub fn new(configuration: Arc<Configuration>) -> Self {
        Self { configuration }
    }
}

impl ParameterHandler for DefaultParameterHandler {
    fn set_parameters(
        &self,
        statement: &mut dyn PreparedStatement,
        names: &[String],
        params: &Params,
    ) -> Result<()> {
        for (index, name) in names.iter().enumerate() {
            // Missing names surface here, at execution time.
            let value = params.resolve(name)?;
            let handler = self.configuration.type_handlers().handler(value.kind())?;
            handler.set_parameter(statement, index, value)?;
        }
        Ok(())
    }
}

/// Decorator routing `set_parameters` through the interceptor chain
pub struct InterceptedParameterHandler {
    configuration: Arc<Configuration>,
    inner: DefaultParameterHandler,
}

impl InterceptedParameterHandler {
    pub fn new(configuration: Arc<Configuration>, inner: DefaultParameterHandler) -> Self {
        Self {
            configuration,
            inner,
        }
    }
}

impl ParameterHandler for InterceptedParameterHandler {
    fn set_parameters(
        &self,
        statement: &mut dyn PreparedStatement,
        names: &[String],
        params: &Params,
    ) -> Result<()> {
        let chain = self.configuration.interceptor_chain();
        let inner = &self.inner;
        let mut args = Args::Parameterize { names, params };
        chain
            .apply(
                Signature::new(TargetKind::ParameterHandler, "set_parameters"),
                &mut args,
                &mut |args| {
                    let Args::Parameterize { names, params } = args else {
                        return Err(MapperError::Interceptor(
                            "parameterize arguments of unexpected shape".to_string(),
                        ));
                    };
                    inner
                        .set_parameters(statement, names, params)
                        .map(|_| Outcome::Done)
                },
            )?
            .into_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::datasource::{DataSource, StubDataSource};
    use crate::error::MapperError;
    use crate::types::Value;

    fn handler(ds: &StubDataSource) -> DefaultParameterHandler {
        let mut config = Configuration::new();
        config.set_data_source(Arc::new(ds.clone()));
        DefaultParameterHandler::new(Arc::new(config))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn binds_values_in_name_order() {
        let ds = StubDataSource::new();
        ds.on_update("insert", 1);
        let handler = handler(&ds);

        let mut connection = ds.connection().unwrap();
        let mut statement = connection.prepare("insert").unwrap();
        let params = Params::named([
            ("name", Value::Text("yy".into())),
            ("age", Value::Integer(18)),
        ]);
        handler
            .set_parameters(statement.as_mut(), &names(&["name", "age"]), &params)
            .unwrap();
        statement.execute_update().unwrap();

        assert_eq!(
            ds.last_bindings("insert").unwrap(),
            vec![Some(Value::Text("yy".into())), Some(Value::Integer(18))]
        );
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let ds = StubDataSource::new();
        let handler = handler(&ds);

        let mut connection = ds.connection().unwrap();
        let mut statement = connection.prepare("insert").unwrap();
        let result = handler.set_parameters(
            statement.as_mut(),
            &names(&["name"]),
            &Params::named([("age", 18)]),
        );
        assert!(matches!(result, Err(MapperError::MissingParameter(_))));
    }

    #[test]
    fn unregistered_type_is_an_error() {
        let ds = StubDataSource::new();
        let handler = handler(&ds);

        let mut connection = ds.connection().unwrap();
        let mut statement = connection.prepare("insert").unwrap();
        let result = handler.set_parameters(
            statement.as_mut(),
            &names(&["blob"]),
            &Params::named([("blob", Value::Bytes(vec![1, 2, 3]))]),
        );
        assert!(matches!(result, Err(MapperError::UnsupportedType(_))));
    }

    #[test]
    fn null_values_bind_as_null() {
        let ds = StubDataSource::new();
        ds.on_update("insert", 1);
        let handler = handler(&ds);

        let mut connection = ds.connection().unwrap();
        let mut statement = connection.prepare("insert").unwrap();
        handler
            .set_parameters(
                statement.as_mut(),
                &names(&["nickname"]),
                &Params::named([("nickname", Value::Null)]),
            )
            .unwrap();
        statement.execute_update().unwrap();

        assert_eq!(ds.last_bindings("insert").unwrap(), vec![Some(Value::Null)]);
    }
}
