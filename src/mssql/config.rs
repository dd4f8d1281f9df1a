use tiberius::{AuthMethod, Client, Config as TiberiusConfig};
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

use crate::config::DbConfig;
use crate::error::MssqlDbError;

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

pub(crate) const APPLICATION_NAME: &str = "mssql-db";

/// Translate a validated [`DbConfig`] into the driver's configuration.
///
/// # Errors
///
/// Returns `MssqlDbError::ConfigError` for an unparseable server string or
/// when integrated authentication is requested but not available in this
/// build.
pub fn build_tiberius_config(opts: &DbConfig) -> Result<TiberiusConfig, MssqlDbError> {
    let address = opts.server_address()?;

    let mut config = TiberiusConfig::new();
    config.host(&address.host);
    config.database(&opts.database);
    config.port(address.port_or_default());
    if let Some(instance) = &address.instance {
        config.instance_name(instance);
    }
    config.authentication(auth_method(opts)?);
    config.application_name(APPLICATION_NAME);
    if opts.trust_server_certificate {
        config.trust_cert();
    }
    Ok(config)
}

fn auth_method(opts: &DbConfig) -> Result<AuthMethod, MssqlDbError> {
    if opts.trusted_connection {
        return integrated_auth();
    }
    Ok(AuthMethod::sql_server(
        opts.user.as_deref().unwrap_or_default(),
        opts.password.as_deref().unwrap_or_default(),
    ))
}

#[cfg(any(windows, all(unix, feature = "integrated-auth-gssapi")))]
fn integrated_auth() -> Result<AuthMethod, MssqlDbError> {
    Ok(AuthMethod::Integrated)
}

#[cfg(not(any(windows, all(unix, feature = "integrated-auth-gssapi"))))]
fn integrated_auth() -> Result<AuthMethod, MssqlDbError> {
    Err(MssqlDbError::ConfigError(
        "integrated authentication needs Windows or the `integrated-auth-gssapi` feature"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_login_config_targets_parsed_address() {
        let opts = DbConfig::builder("drv", "tcp:db.local,1555", "sales")
            .credentials("app", "pw")
            .build()
            .unwrap();
        let config = build_tiberius_config(&opts).unwrap();
        assert_eq!(config.get_addr(), "db.local:1555");
    }

    #[test]
    fn default_port_when_unspecified() {
        let opts = DbConfig::builder("drv", "db.local", "sales")
            .credentials("app", "pw")
            .build()
            .unwrap();
        let config = build_tiberius_config(&opts).unwrap();
        assert_eq!(config.get_addr(), "db.local:1433");
    }

    #[cfg(not(any(windows, feature = "integrated-auth-gssapi")))]
    #[test]
    fn integrated_auth_unavailable_is_config_error() {
        let opts = DbConfig::builder("drv", "db.local", "sales")
            .trusted_connection(true)
            .build()
            .unwrap();
        assert!(matches!(
            build_tiberius_config(&opts),
            Err(MssqlDbError::ConfigError(_))
        ));
    }
}
