// MSSQL module - SQL Server access through tiberius
//
// - config: DbConfig -> tiberius::Config, authentication selection
// - client: TCP / SQL Browser connect and login
// - query: parameter binding, result stream draining, value extraction
// - executor: blocking Connector/Session implementation

pub mod client;
pub mod config;
pub mod executor;
pub mod query;

pub use client::create_mssql_client;
pub use config::{MssqlClient, build_tiberius_config};
pub use executor::{MssqlConnector, MssqlSession};
pub use query::{bind_query_params, run_batches};
