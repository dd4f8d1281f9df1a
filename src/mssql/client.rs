use tiberius::{Client, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::info;

use super::config::{MssqlClient, build_tiberius_config};
use crate::config::DbConfig;
use crate::error::MssqlDbError;

/// Open a new SQL Server connection.
///
/// Named instances without an explicit port are located through the SQL
/// Server Browser service; everything else connects straight to
/// `host:port`.
///
/// # Errors
/// Returns `MssqlDbError::ConnectionError` if the TCP connection or login fails.
pub async fn create_mssql_client(opts: &DbConfig) -> Result<MssqlClient, MssqlDbError> {
    let address = opts.server_address()?;
    let config = build_tiberius_config(opts)?;

    let tcp = if address.instance.is_some() && address.port.is_none() {
        TcpStream::connect_named(&config).await.map_err(|e| {
            MssqlDbError::ConnectionError(format!("SQL Browser lookup for {} failed: {e}", opts.server))
        })?
    } else {
        TcpStream::connect(config.get_addr()).await.map_err(|e| {
            MssqlDbError::ConnectionError(format!("TCP connection error: {e}"))
        })?
    };
    tcp.set_nodelay(true).ok();

    let client = Client::connect(config, tcp.compat_write()).await.map_err(|e| {
        MssqlDbError::ConnectionError(format!("SQL Server connection error: {e}"))
    })?;

    info!(
        server = %opts.server,
        database = %opts.database,
        driver = %opts.driver,
        integrated = opts.trusted_connection,
        "opened SQL Server connection"
    );
    Ok(client)
}
