//! A small blocking helper over SQL Server.
//!
//! One [`Database`] holds the configuration and a single, lazily opened
//! connection. Queries take positional `?` parameters bound by the driver,
//! stored procedures are called by name with named arguments, and every
//! row comes back as a [`Record`] keyed by snake_case column name.
//!
//! ```no_run
//! use mssql_db::prelude::*;
//!
//! # fn demo() -> Result<(), MssqlDbError> {
//! let mut db = Database::init(DbConfig::from_env()?)?;
//! if let Some(user) = db.fetch_one("SELECT UserID, LastLogin FROM dbo.Users WHERE UserID = ?", &[RowValues::Int(7)])? {
//!     println!("{:?}", user.get("last_login"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod batches;
pub mod config;
pub mod database;
pub mod error;
pub mod mssql;
pub mod naming;
pub mod prelude;
pub mod procedure;
pub mod results;
pub mod session;
pub mod translation;
pub mod types;

pub use config::DbConfig;
pub use database::Database;
pub use error::MssqlDbError;
pub use results::{Record, ResultSet};
pub use types::RowValues;
