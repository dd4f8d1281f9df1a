use std::fmt;

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use super::client::create_mssql_client;
use super::config::MssqlClient;
use super::query::run_batches;
use crate::batches::ResultBatches;
use crate::config::DbConfig;
use crate::error::MssqlDbError;
use crate::session::{Connector, Session};
use crate::types::RowValues;

/// Opens blocking SQL Server sessions.
///
/// Each session drives the async driver on its own current-thread runtime,
/// so calls must not be made from inside another tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlConnector;

impl Connector for MssqlConnector {
    type Session = MssqlSession;

    fn connect(&self, config: &DbConfig) -> Result<MssqlSession, MssqlDbError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                MssqlDbError::ConnectionError(format!("cannot start I/O runtime: {e}"))
            })?;
        let client = runtime.block_on(create_mssql_client(config))?;
        Ok(MssqlSession { runtime, client })
    }
}

/// A live SQL Server connection with its runtime.
pub struct MssqlSession {
    runtime: Runtime,
    client: MssqlClient,
}

impl fmt::Debug for MssqlSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MssqlSession").finish_non_exhaustive()
    }
}

impl Session for MssqlSession {
    fn run(&mut self, sql: &str, params: &[RowValues]) -> Result<ResultBatches, MssqlDbError> {
        let Self { runtime, client } = self;
        let batches = runtime.block_on(run_batches(client, sql, params))?;
        debug!(result_sets = batches.len(), "SQL Server round trip finished");
        Ok(batches)
    }

    fn close(self) -> Result<(), MssqlDbError> {
        let Self { runtime, client } = self;
        runtime.block_on(client.close())?;
        debug!("closed SQL Server connection");
        Ok(())
    }
}
