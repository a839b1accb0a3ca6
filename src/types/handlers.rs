//! Type handlers: encode one `Value` into one prepared-statement slot
//!
//! The registry maps a value kind to its handler. Kinds without a registered
//! handler fail with an unsupported-type error rather than guessing an
//! encoding; callers can register their own handler for extra kinds.

use crate::datasource::PreparedStatement;
use crate::error::{MapperError, Result};
use crate::types::{Value, ValueKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Encodes values of one kind into a statement slot
pub trait TypeHandler: Send + Sync {
    fn set_parameter(
        &self,
        statement: &mut dyn PreparedStatement,
        index: usize,
        value: &Value,
    ) -> Result<()>;
}

fn unexpected(handler: &str, value: &Value) -> MapperError {
    MapperError::TypeError(format!(
        "{} handler received {} value",
        handler,
        value.kind().name()
    ))
}

pub struct IntegerHandler;

impl TypeHandler for IntegerHandler {
    fn set_parameter(
        &self,
        statement: &mut dyn PreparedStatement,
        index: usize,
        value: &Value,
    ) -> Result<()> {
        match value {
            Value::Integer(v) => statement.set_integer(index, *v),
            other => Err(unexpected("integer", other)),
        }
    }
}

pub struct FloatHandler;

impl TypeHandler for FloatHandler {
    fn set_parameter(
        &self,
        statement: &mut dyn PreparedStatement,
        index: usize,
        value: &Value,
    ) -> Result<()> {
        match value {
            Value::Float(v) => statement.set_float(index, *v),
            other => Err(unexpected("float", other)),
        }
    }
}

pub struct TextHandler;

impl TypeHandler for TextHandler {
    fn set_parameter(
        &self,
        statement: &mut dyn PreparedStatement,
        index: usize,
        value: &Value,
    ) -> Result<()> {
        match value {
            Value::Text(v) => statement.set_text(index, v),
            other => Err(unexpected("text", other)),
        }
    }
}

pub struct BoolHandler;

impl TypeHandler for BoolHandler {
    fn set_parameter(
        &self,
        statement: &mut dyn PreparedStatement,
        index: usize,
        value: &Value,
    ) -> Result<()> {
        match value {
            Value::Bool(v) => statement.set_bool(index, *v),
            other => Err(unexpected("bool", other)),
        }
    }
}

pub struct NullHandler;

impl TypeHandler for NullHandler {
    fn set_parameter(
        &self,
        statement: &mut dyn PreparedStatement,
        index: usize,
        _value: &Value,
    ) -> Result<()> {
        statement.set_null(index)
    }
}

/// Kind -> handler lookup, populated with the built-ins by default
pub struct TypeHandlerRegistry {
    handlers: HashMap<ValueKind, Arc<dyn TypeHandler>>,
}

impl Default for TypeHandlerRegistry {
    fn default() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };
        registry.register(ValueKind::Integer, Arc::new(IntegerHandler));
        registry.register(ValueKind::Float, Arc::new(FloatHandler));
        registry.register(ValueKind::Text, Arc::new(TextHandler));
        registry.register(ValueKind::Bool, Arc::new(BoolHandler));
        registry.register(ValueKind::Null, Arc::new(NullHandler));
        registry
    }
}

impl TypeHandlerRegistry {
    pub fn register(&mut self, kind: ValueKind, handler: Arc<dyn TypeHandler>) {
        self.handlers.insert(kind, handler);
    }

    pub fn handler(&self, kind: ValueKind) -> Result<&Arc<dyn TypeHandler>> {
        self.handlers
            .get(&kind)
            .ok_or_else(|| MapperError::UnsupportedType(kind.name().to_string()))
    }
}
