//! Value and row types shared across the execution pipeline

mod handlers;
mod params;

pub use handlers::{
    BoolHandler, FloatHandler, IntegerHandler, NullHandler, TextHandler, TypeHandler,
    TypeHandlerRegistry,
};
pub use params::Params;

use crate::error::{MapperError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unified value type for parameters and result columns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    /// Integer value
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// Text string
    Text(String),

    /// Boolean value
    Bool(bool),

    /// Raw byte string (no default type handler)
    Bytes(Vec<u8>),

    /// Null value
    Null,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Bool(_) => ValueKind::Bool,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Null => ValueKind::Null,
        }
    }
}

/// Discriminant used to look up a type handler for a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    Float,
    Text,
    Bool,
    Bytes,
    Null,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Bool => "bool",
            ValueKind::Bytes => "bytes",
            ValueKind::Null => "null",
        }
    }
}

/// A decoded row: column name -> value
pub type SqlRow = HashMap<String, Value>;

/// The full result of one query
pub type RowSet = Vec<SqlRow>;

/// Decodes one `SqlRow` into a caller type by column-name lookup.
///
/// Any failure (missing column, type mismatch) is fatal for the whole call;
/// there are no partial results.
pub trait FromRow: Sized {
    fn from_row(row: &SqlRow) -> Result<Self>;
}

/// Identity decoding for callers that want the raw column map
impl FromRow for SqlRow {
    fn from_row(row: &SqlRow) -> Result<Self> {
        Ok(row.clone())
    }
}

/// Typed column accessors for `SqlRow`
pub trait RowAccess {
    fn integer(&self, column: &str) -> Result<i64>;
    fn float(&self, column: &str) -> Result<f64>;
    fn text(&self, column: &str) -> Result<String>;
    fn bool(&self, column: &str) -> Result<bool>;
    /// Returns `None` for a NULL column, an error for a missing one.
    fn opt_integer(&self, column: &str) -> Result<Option<i64>>;
    fn opt_text(&self, column: &str) -> Result<Option<String>>;
}

fn column<'a>(row: &'a SqlRow, name: &str) -> Result<&'a Value> {
    row.get(name)
        .ok_or_else(|| MapperError::ColumnNotFound(name.to_string()))
}

fn mismatch(column: &str, expected: &str, got: &Value) -> MapperError {
    MapperError::TypeError(format!(
        "column '{}': expected {}, got {}",
        column,
        expected,
        got.kind().name()
    ))
}

impl RowAccess for SqlRow {
    fn integer(&self, name: &str) -> Result<i64> {
        match column(self, name)? {
            Value::Integer(v) => Ok(*v),
            other => Err(mismatch(name, "integer", other)),
        }
    }

    fn float(&self, name: &str) -> Result<f64> {
        match column(self, name)? {
            Value::Float(v) => Ok(*v),
            // Integer widens to float, mirroring value comparison rules
            Value::Integer(v) => Ok(*v as f64),
            other => Err(mismatch(name, "float", other)),
        }
    }

    fn text(&self, name: &str) -> Result<String> {
        match column(self, name)? {
            Value::Text(v) => Ok(v.clone()),
            other => Err(mismatch(name, "text", other)),
        }
    }

    fn bool(&self, name: &str) -> Result<bool> {
        match column(self, name)? {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch(name, "bool", other)),
        }
    }

    fn opt_integer(&self, name: &str) -> Result<Option<i64>> {
        match column(self, name)? {
            Value::Null => Ok(None),
            Value::Integer(v) => Ok(Some(*v)),
            other => Err(mismatch(name, "integer", other)),
        }
    }

    fn opt_text(&self, name: &str) -> Result<Option<String>> {
        match column(self, name)? {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v.clone())),
            other => Err(mismatch(name, "text", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> SqlRow {
        let mut row = SqlRow::new();
        row.insert("id".to_string(), Value::Integer(7));
        row.insert("name".to_string(), Value::Text("jvyou".to_string()));
        row.insert("score".to_string(), Value::Float(99.5));
        row.insert("active".to_string(), Value::Bool(true));
        row.insert("nickname".to_string(), Value::Null);
        row
    }

    #[test]
    fn typed_accessors() {
        let row = sample_row();
        assert_eq!(row.integer("id").unwrap(), 7);
        assert_eq!(row.text("name").unwrap(), "jvyou");
        assert_eq!(row.float("score").unwrap(), 99.5);
        assert!(row.bool("active").unwrap());
        assert_eq!(row.opt_text("nickname").unwrap(), None);
    }

    #[test]
    fn integer_widens_to_float() {
        let row = sample_row();
        assert_eq!(row.float("id").unwrap(), 7.0);
    }

    #[test]
    fn missing_column_is_an_error() {
        let row = sample_row();
        assert!(matches!(
            row.integer("age"),
            Err(MapperError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let row = sample_row();
        assert!(matches!(row.integer("name"), Err(MapperError::TypeError(_))));
    }
}
