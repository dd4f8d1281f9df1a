//! The seam between [`Database`](crate::Database) and the driver.
//!
//! [`MssqlConnector`](crate::mssql::MssqlConnector) is the production
//! implementation; tests plug in scripted sessions.

use crate::batches::ResultBatches;
use crate::config::DbConfig;
use crate::error::MssqlDbError;
use crate::types::RowValues;

/// Opens sessions from a validated configuration.
pub trait Connector {
    type Session: Session;

    /// Open a new live session.
    ///
    /// # Errors
    ///
    /// Returns a connection or configuration error when the server cannot be
    /// reached or the login is refused.
    fn connect(&self, config: &DbConfig) -> Result<Self::Session, MssqlDbError>;
}

/// One live connection. Every call blocks until the server answers.
pub trait Session {
    /// Run `sql` with `params` bound to its `@P1..@Pn` placeholders and
    /// collect every result batch the server sends back.
    ///
    /// # Errors
    ///
    /// Propagates driver errors unchanged.
    fn run(&mut self, sql: &str, params: &[RowValues]) -> Result<ResultBatches, MssqlDbError>;

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Propagates driver errors raised while saying goodbye to the server.
    fn close(self) -> Result<(), MssqlDbError>;
}
