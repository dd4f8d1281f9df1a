use tracing::debug;

use crate::batches::ResultBatches;
use crate::config::DbConfig;
use crate::error::MssqlDbError;
use crate::mssql::MssqlConnector;
use crate::naming::column_names;
use crate::procedure::{ProcedureCall, ProcedureResults, capture};
use crate::results::{Record, ResultSet, rows_to_records};
use crate::session::{Connector, Session};
use crate::translation::translate_placeholders;
use crate::types::RowValues;

/// Owns the configuration and at most one live connection.
///
/// The connection is opened on first use and reused until [`close`](Self::close).
/// Every operation takes `&mut self`; share a `Database` across threads
/// only behind your own lock.
///
/// ```no_run
/// use mssql_db::prelude::*;
///
/// # fn demo() -> Result<(), MssqlDbError> {
/// let config = DbConfig::builder("ODBC Driver 18 for SQL Server", r"db01\REPORTING", "sales")
///     .credentials("report_user", "secret")
///     .build()?;
/// let mut db = Database::init(config)?;
///
/// let customers = db.fetch_all(
///     "SELECT CustomerID, DisplayName FROM dbo.Customers WHERE Region = ?",
///     &[RowValues::Text("EMEA".into())],
/// )?;
/// for customer in &customers {
///     println!("{:?}", customer.get("display_name"));
/// }
///
/// let results = db.call_procedure(
///     "dbo.usp_ArchiveOrders",
///     &[("Before", RowValues::Text("2024-01-01".into()))],
///     Some("RowCount"),
///     true,
/// )?;
/// println!("archived {:?}", results.out_value()?);
/// db.close()?;
/// # Ok(())
/// # }
/// ```
pub struct Database<C: Connector = MssqlConnector> {
    config: DbConfig,
    connector: C,
    session: Option<C::Session>,
}

impl Database<MssqlConnector> {
    /// Store the configuration; no connection is opened yet.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ConfigError` if a required field is missing.
    pub fn init(config: DbConfig) -> Result<Self, MssqlDbError> {
        Self::with_connector(config, MssqlConnector)
    }
}

impl<C: Connector> Database<C> {
    /// Like [`Database::init`] with a caller-supplied connector.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ConfigError` if a required field is missing.
    pub fn with_connector(config: DbConfig, connector: C) -> Result<Self, MssqlDbError> {
        config.validate()?;
        Ok(Self {
            config,
            connector,
            session: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// The live connection, opened now if there is none.
    ///
    /// # Errors
    ///
    /// Propagates connection failures from the connector.
    pub fn get_connection(&mut self) -> Result<&mut C::Session, MssqlDbError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => self.connector.connect(&self.config)?,
        };
        Ok(self.session.insert(session))
    }

    /// Close and forget the connection. Does nothing when none is open.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if closing fails; the connection is
    /// forgotten either way.
    pub fn close(&mut self) -> Result<(), MssqlDbError> {
        match self.session.take() {
            Some(session) => session.close(),
            None => Ok(()),
        }
    }

    /// Run `sql` with positional `?` parameters and return every row of the
    /// first result set. Matching nothing gives an empty set.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ParameterError` when the `?` count and
    /// `params` disagree; driver errors propagate unchanged.
    pub fn fetch_all(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, MssqlDbError> {
        let batches = self.run(sql, params)?;
        match batches.into_first() {
            Some(batch) if batch.has_columns() => {
                rows_to_records(&column_names(&batch.columns), batch.rows)
            }
            _ => Ok(ResultSet::default()),
        }
    }

    /// Like [`fetch_all`](Self::fetch_all) but only the first record.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_all`](Self::fetch_all).
    pub fn fetch_one(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Option<Record>, MssqlDbError> {
        Ok(self.fetch_all(sql, params)?.into_iter().next())
    }

    /// Execute a stored procedure.
    ///
    /// `in_args` are bound in order as `@name = ?`, each non-null value as
    /// text except binary, which stays binary. With `out_arg`, the procedure's return value is captured and
    /// must be present in the last result set. `as_dict == false` returns
    /// column names and raw rows instead of records.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::MissingOutArgument` when the out value was not
    /// captured, `ParameterError` for invalid names; driver errors propagate.
    pub fn call_procedure(
        &mut self,
        name: &str,
        in_args: &[(&str, RowValues)],
        out_arg: Option<&str>,
        as_dict: bool,
    ) -> Result<ProcedureResults, MssqlDbError> {
        let mut call = ProcedureCall::new(name)
            .args(in_args.iter().map(|(k, v)| (*k, v.clone())))
            .as_dict(as_dict);
        if let Some(out) = out_arg {
            call = call.out_arg(out);
        }
        self.call(&call)
    }

    /// Execute a prepared [`ProcedureCall`].
    ///
    /// # Errors
    ///
    /// Same as [`call_procedure`](Self::call_procedure).
    pub fn call(&mut self, call: &ProcedureCall) -> Result<ProcedureResults, MssqlDbError> {
        let statement = call.statement()?;
        let params = call.bound_params();
        debug!(
            procedure = call.name(),
            args = params.len(),
            out_arg = call.out_arg_name(),
            "calling stored procedure"
        );

        let batches = self.run(&statement, &params)?;
        let sets = capture(batches, call.is_as_dict())?;
        let results = ProcedureResults::new(sets, call.out_arg_name().map(str::to_string));
        if results.out_arg().is_some() {
            results.out_value()?;
        }
        Ok(results)
    }

    fn run(&mut self, sql: &str, params: &[RowValues]) -> Result<ResultBatches, MssqlDbError> {
        let translated = translate_placeholders(sql);
        translated.check_arity(params.len())?;
        debug!(sql = %translated.sql, params = params.len(), "executing statement");
        self.get_connection()?.run(&translated.sql, params)
    }
}
