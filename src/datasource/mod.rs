//! Connectivity seam: the traits a database driver implements
//!
//! The execution pipeline never opens or configures connections itself; it
//! drives whatever driver is plugged in through these traits. Timeouts,
//! cancellation and the wire protocol belong to the driver; errors it
//! raises propagate unchanged, and nothing here retries a failed statement.

pub mod stub;

pub use stub::StubDataSource;

use crate::error::Result;
use crate::types::Value;

/// Hands out connections; owned by the configuration, shared by sessions
pub trait DataSource: Send + Sync {
    fn connection(&self) -> Result<Box<dyn Connection>>;
}

/// One live connection with transaction primitives
pub trait Connection {
    /// Compiles positional-marker SQL into a reusable statement handle.
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn PreparedStatement>>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// A compiled statement with positional parameter slots (0-based)
pub trait PreparedStatement {
    fn set_integer(&mut self, index: usize, value: i64) -> Result<()>;

    fn set_float(&mut self, index: usize, value: f64) -> Result<()>;

    fn set_text(&mut self, index: usize, value: &str) -> Result<()>;

    fn set_bool(&mut self, index: usize, value: bool) -> Result<()>;

    fn set_null(&mut self, index: usize) -> Result<()>;

    fn execute_query(&mut self) -> Result<ResultSet>;

    fn execute_update(&mut self) -> Result<usize>;
}

/// Raw rows as the driver returns them: column names plus value rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
