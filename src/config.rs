//! Connection configuration.
//!
//! A `DbConfig` is built once at start-up, validated, and then only read.
//! It can come from code (`DbConfig::builder`), from a string mapping using
//! the conventional `DB_*` keys, from the process environment, or from JSON.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::MssqlDbError;

pub const KEY_DRIVER: &str = "DB_DRIVER";
pub const KEY_SERVER: &str = "DB_SERVER";
pub const KEY_DATABASE: &str = "DB_NAME";
pub const KEY_USER: &str = "DB_USER";
pub const KEY_PASSWORD: &str = "DB_PASSWORD";
pub const KEY_TRUSTED_CONNECTION: &str = "DB_TRUSTED_CONNECTION";
pub const KEY_TRUST_SERVER_CERTIFICATE: &str = "DB_TRUST_SERVER_CERTIFICATE";

pub const DEFAULT_PORT: u16 = 1433;

/// Connection settings for one SQL Server database.
#[derive(Clone, Deserialize)]
pub struct DbConfig {
    /// Driver name as configured by the deployment (e.g. `ODBC Driver 18 for SQL Server`).
    /// Recorded for diagnostics; the wire protocol is always TDS.
    #[serde(alias = "DB_DRIVER")]
    pub driver: String,
    /// `host`, `host,port`, `host\instance` or `host\instance,port`, optionally `tcp:`-prefixed.
    #[serde(alias = "DB_SERVER")]
    pub server: String,
    #[serde(alias = "DB_NAME")]
    pub database: String,
    #[serde(default, alias = "DB_USER")]
    pub user: Option<String>,
    #[serde(default, alias = "DB_PASSWORD")]
    pub password: Option<String>,
    /// Log in with the caller's OS identity instead of user/password.
    #[serde(alias = "DB_TRUSTED_CONNECTION", deserialize_with = "flag::deserialize")]
    pub trusted_connection: bool,
    #[serde(
        default = "default_trust_cert",
        alias = "DB_TRUST_SERVER_CERTIFICATE",
        deserialize_with = "flag::deserialize"
    )]
    pub trust_server_certificate: bool,
}

fn default_trust_cert() -> bool {
    true
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("driver", &self.driver)
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("trusted_connection", &self.trusted_connection)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .finish()
    }
}

impl DbConfig {
    /// Start a builder with the three fields every configuration needs.
    #[must_use]
    pub fn builder(
        driver: impl Into<String>,
        server: impl Into<String>,
        database: impl Into<String>,
    ) -> DbConfigBuilder {
        DbConfigBuilder::new(driver, server, database)
    }

    /// Build from a string mapping keyed by `DB_DRIVER`, `DB_SERVER`, ...
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ConfigError` naming the first missing key, or
    /// an unparseable flag.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, MssqlDbError> {
        Self::from_lookup(|key| map.get(key).cloned())
    }

    /// Build from process environment variables named like the mapping keys.
    ///
    /// # Errors
    ///
    /// Same as [`from_map`](Self::from_map).
    pub fn from_env() -> Result<Self, MssqlDbError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse a JSON object. Keys may be the `DB_*` names or the field names.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ConfigError` on malformed JSON, a missing field,
    /// or when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, MssqlDbError> {
        let config: DbConfig = serde_json::from_str(json)
            .map_err(|e| MssqlDbError::ConfigError(format!("invalid JSON configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ConfigError` if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MssqlDbError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MssqlDbError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, MssqlDbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .ok_or_else(|| MssqlDbError::ConfigError(format!("missing required field {key}")))
        };
        let trusted_connection = match lookup(KEY_TRUSTED_CONNECTION) {
            Some(raw) => flag::parse(&raw).map_err(MssqlDbError::ConfigError)?,
            None => {
                return Err(MssqlDbError::ConfigError(format!(
                    "missing required field {KEY_TRUSTED_CONNECTION}"
                )));
            }
        };
        let trust_server_certificate = match lookup(KEY_TRUST_SERVER_CERTIFICATE) {
            Some(raw) => flag::parse(&raw).map_err(MssqlDbError::ConfigError)?,
            None => default_trust_cert(),
        };

        let config = DbConfig {
            driver: required(KEY_DRIVER)?,
            server: required(KEY_SERVER)?,
            database: required(KEY_DATABASE)?,
            user: lookup(KEY_USER),
            password: lookup(KEY_PASSWORD),
            trusted_connection,
            trust_server_certificate,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every field the chosen authentication mode needs is present.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ConfigError` describing the first problem found.
    pub fn validate(&self) -> Result<(), MssqlDbError> {
        for (key, value) in [
            (KEY_DRIVER, &self.driver),
            (KEY_SERVER, &self.server),
            (KEY_DATABASE, &self.database),
        ] {
            if value.trim().is_empty() {
                return Err(MssqlDbError::ConfigError(format!(
                    "missing required field {key}"
                )));
            }
        }
        if !self.trusted_connection {
            if self.user.as_deref().is_none_or(|u| u.trim().is_empty()) {
                return Err(MssqlDbError::ConfigError(format!(
                    "missing required field {KEY_USER} (required unless {KEY_TRUSTED_CONNECTION} is set)"
                )));
            }
            if self.password.is_none() {
                return Err(MssqlDbError::ConfigError(format!(
                    "missing required field {KEY_PASSWORD} (required unless {KEY_TRUSTED_CONNECTION} is set)"
                )));
            }
        }
        self.server_address()?;
        Ok(())
    }

    /// Parsed form of [`server`](Self::server).
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ConfigError` for an empty host or a bad port.
    pub fn server_address(&self) -> Result<ServerAddress, MssqlDbError> {
        ServerAddress::parse(&self.server)
    }
}

/// Fluent builder for [`DbConfig`].
#[derive(Debug, Clone)]
pub struct DbConfigBuilder {
    config: DbConfig,
}

impl DbConfigBuilder {
    #[must_use]
    pub fn new(
        driver: impl Into<String>,
        server: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            config: DbConfig {
                driver: driver.into(),
                server: server.into(),
                database: database.into(),
                user: None,
                password: None,
                trusted_connection: false,
                trust_server_certificate: default_trust_cert(),
            },
        }
    }

    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.user = Some(user.into());
        self.config.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn trusted_connection(mut self, trusted: bool) -> Self {
        self.config.trusted_connection = trusted;
        self
    }

    #[must_use]
    pub fn trust_server_certificate(mut self, trust: bool) -> Self {
        self.config.trust_server_certificate = trust;
        self
    }

    /// Validate and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ConfigError` if a required field is missing.
    pub fn build(self) -> Result<DbConfig, MssqlDbError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Where to connect, split out of the ODBC-style server string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: Option<u16>,
    pub instance: Option<String>,
}

impl ServerAddress {
    /// Parse `[tcp:]host[\instance][,port]`.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ConfigError` for an empty host or a bad port.
    pub fn parse(server: &str) -> Result<Self, MssqlDbError> {
        let trimmed = server.trim();
        let trimmed = trimmed.strip_prefix("tcp:").unwrap_or(trimmed);

        let (rest, port) = match trimmed.rsplit_once(',') {
            Some((rest, port)) => {
                let port = port.trim().parse::<u16>().map_err(|e| {
                    MssqlDbError::ConfigError(format!("invalid port in server {server:?}: {e}"))
                })?;
                (rest, Some(port))
            }
            None => (trimmed, None),
        };

        let (host, instance) = match rest.split_once('\\') {
            Some((host, instance)) if !instance.trim().is_empty() => {
                (host, Some(instance.trim().to_string()))
            }
            Some((host, _)) => (host, None),
            None => (rest, None),
        };

        let host = host.trim();
        if host.is_empty() {
            return Err(MssqlDbError::ConfigError(format!(
                "server {server:?} has no host"
            )));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            instance,
        })
    }

    /// Port to use when no instance lookup is involved.
    #[must_use]
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

mod flag {
    use serde::{Deserialize, Deserializer};

    pub(super) fn parse(raw: &str) -> Result<bool, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" | "on" => Ok(true),
            "no" | "false" | "0" | "off" | "" => Ok(false),
            other => Err(format!("cannot interpret {other:?} as a yes/no flag")),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Bool(b) => Ok(b),
            Raw::Int(i) => Ok(i != 0),
            Raw::Text(s) => parse(&s).map_err(serde::de::Error::custom),
        }
    }
}
