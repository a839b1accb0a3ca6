//! Parameter values passed into statement execution
//!
//! A statement takes either nothing, a single scalar, or a set of named
//! values. Structured records enter through serde so callers do not hand-roll
//! field maps. `BTreeMap` keeps the canonical encoding independent of field
//! declaration order, which the second-level cache key depends on.

use crate::error::{MapperError, Result};
use crate::types::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// The parameter value for one statement invocation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// No parameters
    #[default]
    None,

    /// A single scalar, bound to every placeholder regardless of name
    Scalar(Value),

    /// Named values, bound by placeholder name
    Named(BTreeMap<String, Value>),
}

impl Params {
    pub fn none() -> Self {
        Params::None
    }

    pub fn scalar(value: impl Into<Value>) -> Self {
        Params::Scalar(value.into())
    }

    pub fn named<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Params::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Converts a serializable record into named parameters.
    ///
    /// Scalar records become `Params::Scalar`; flat structs and maps become
    /// `Params::Named`. Nested structures have no SQL binding and are
    /// rejected as unsupported.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self> {
        let json = serde_json::to_value(record)?;
        match json {
            serde_json::Value::Null => Ok(Params::None),
            serde_json::Value::Object(fields) => {
                let mut named = BTreeMap::new();
                for (name, field) in fields {
                    named.insert(name, json_to_value(field)?);
                }
                Ok(Params::Named(named))
            }
            scalar => Ok(Params::Scalar(json_to_value(scalar)?)),
        }
    }

    /// Looks up the value for one placeholder name.
    ///
    /// Existence is checked here, at execution time, never at SQL build time.
    pub fn resolve(&self, name: &str) -> Result<&Value> {
        match self {
            Params::None => Err(MapperError::MissingParameter(name.to_string())),
            Params::Scalar(value) => Ok(value),
            Params::Named(map) => map
                .get(name)
                .ok_or_else(|| MapperError::MissingParameter(name.to_string())),
        }
    }

    /// Deterministic by-value encoding used for cache keys.
    ///
    /// Equal-by-value parameters must produce identical strings regardless of
    /// object identity or field declaration order; `BTreeMap` iteration and
    /// float bit patterns make that hold.
    pub fn canonical(&self) -> String {
        match self {
            Params::None => "()".to_string(),
            Params::Scalar(value) => canonical_value(value),
            Params::Named(map) => {
                let mut out = String::from("{");
                for (i, (name, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(name);
                    out.push('=');
                    out.push_str(&canonical_value(value));
                }
                out.push('}');
                out
            }
        }
    }
}

fn canonical_value(value: &Value) -> String {
    match value {
        Value::Integer(v) => format!("i:{}", v),
        Value::Float(v) => format!("f:{:016x}", v.to_bits()),
        Value::Text(v) => format!("t:{}:{}", v.len(), v),
        Value::Bool(v) => format!("b:{}", v),
        Value::Bytes(v) => {
            let mut out = String::from("x:");
            for byte in v {
                out.push_str(&format!("{:02x}", byte));
            }
            out
        }
        Value::Null => "n".to_string(),
    }
}

fn json_to_value(json: serde_json::Value) -> Result<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(v) => Ok(Value::Bool(v)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(MapperError::UnsupportedType(format!(
                    "numeric parameter out of range: {}",
                    n
                )))
            }
        }
        serde_json::Value::String(v) => Ok(Value::Text(v)),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
            MapperError::UnsupportedType("nested record fields cannot be bound".to_string()),
        ),
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct User {
        name: String,
        age: i64,
    }

    #[derive(Serialize)]
    struct UserReversed {
        age: i64,
        name: String,
    }

    #[test]
    fn record_becomes_named_params() {
        let params = Params::from_record(&User {
            name: "jvyou".to_string(),
            age: 18,
        })
        .unwrap();
        assert_eq!(params.resolve("name").unwrap(), &Value::Text("jvyou".into()));
        assert_eq!(params.resolve("age").unwrap(), &Value::Integer(18));
    }

    #[test]
    fn canonical_is_field_order_independent() {
        let a = Params::from_record(&User {
            name: "yy".to_string(),
            age: 20,
        })
        .unwrap();
        let b = Params::from_record(&UserReversed {
            age: 20,
            name: "yy".to_string(),
        })
        .unwrap();
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn canonical_differs_for_different_values() {
        let a = Params::named([("age", 20)]);
        let b = Params::named([("age", 21)]);
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn scalar_resolves_for_any_name() {
        let params = Params::scalar(1);
        assert_eq!(params.resolve("id").unwrap(), &Value::Integer(1));
        assert_eq!(params.resolve("anything").unwrap(), &Value::Integer(1));
    }

    #[test]
    fn missing_name_is_an_error() {
        let params = Params::named([("name", "yy")]);
        assert!(matches!(
            params.resolve("age"),
            Err(MapperError::MissingParameter(_))
        ));
        assert!(matches!(
            Params::None.resolve("id"),
            Err(MapperError::MissingParameter(_))
        ));
    }

    #[test]
    fn nested_record_is_rejected() {
        #[derive(Serialize)]
        struct Outer {
            inner: User,
        }
        let result = Params::from_record(&Outer {
            inner: User {
                name: "x".to_string(),
                age: 1,
            },
        });
        assert!(matches!(result, Err(MapperError::UnsupportedType(_))));
    }
}
