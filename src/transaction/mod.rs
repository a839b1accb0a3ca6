//! Transaction seam between executors and the connectivity layer
//!
//! The pipeline never owns transaction boundaries; it drives whatever the
//! session supplies through this trait and passes commit/rollback through.

use crate::datasource::{Connection, DataSource};
use crate::error::{MapperError, Result};

/// One logical transaction over one live connection
pub trait Transaction {
    /// The connection this transaction runs on.
    fn connection(&mut self) -> Result<&mut dyn Connection>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// Releases the connection; the transaction is unusable afterwards.
    fn close(&mut self) -> Result<()>;
}

/// Default transaction: owns a single driver connection for its lifetime
pub struct ManagedTransaction {
    connection: Option<Box<dyn Connection>>,
}

impl ManagedTransaction {
    pub fn new(connection: Box<dyn Connection>) -> Self {
        Self {
            connection: Some(connection),
        }
    }

    /// Opens a fresh connection from the data source.
    pub fn open(data_source: &dyn DataSource) -> Result<Self> {
        Ok(Self::new(data_source.connection()?))
    }

    fn live(&mut self) -> Result<&mut Box<dyn Connection>> {
        self.connection
            .as_mut()
            .ok_or_else(|| MapperError::Executor("transaction is closed".to_string()))
    }
}

impl Transaction for ManagedTransaction {
    fn connection(&mut self) -> Result<&mut dyn Connection> {
        Ok(self.live()?.as_mut())
    }

    fn commit(&mut self) -> Result<()> {
        self.live()?.commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.live()?.rollback()
    }

    fn close(&mut self) -> Result<()> {
        match self.connection.take() {
            Some(mut connection) => connection.close(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::StubDataSource;

    #[test]
    fn close_releases_the_connection() {
        let ds = StubDataSource::new();
        let mut tx = ManagedTransaction::open(&ds).unwrap();
        assert!(tx.connection().is_ok());

        tx.close().unwrap();
        assert!(matches!(tx.connection(), Err(MapperError::Executor(_))));
        // Closing twice is a no-op.
        tx.close().unwrap();
        assert_eq!(ds.stats().closes, 1);
    }

    #[test]
    fn commit_and_rollback_reach_the_driver() {
        let ds = StubDataSource::new();
        let mut tx = ManagedTransaction::open(&ds).unwrap();
        tx.commit().unwrap();
        tx.rollback().unwrap();

        let stats = ds.stats();
        assert_eq!(stats.commits, 1);
        assert_eq!(stats.rollbacks, 1);
    }
}
