//! Error types for the sqlmapper execution pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapperError>;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Statement not found: {0}")]
    StatementNotFound(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Unsupported parameter type: {0}")]
    UnsupportedType(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Expected one result (or none), but found {0}")]
    TooManyResults(usize),

    #[error("Statement error: {0}")]
    Statement(String),

    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Interceptor error: {0}")]
    Interceptor(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MapperError {
    fn from(err: serde_json::Error) -> Self {
        MapperError::Serialization(err.to_string())
    }
}
