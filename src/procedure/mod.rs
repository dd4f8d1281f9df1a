//! Stored procedure calls.
//!
//! A call is sent as one T-SQL batch:
//!
//! ```text
//! DECLARE @rowcount INTEGER;EXEC @rowcount = dbo.usp_Load @Region = ?, @Since = ?;SELECT @rowcount AS rowcount;
//! ```
//!
//! The procedure's own result sets come back first; when an out argument
//! was requested its value is the trailing single-row set.

mod accessors;

pub use accessors::{get_first_result_set, get_out_value, get_result_set};

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::batches::ResultBatches;
use crate::error::MssqlDbError;
use crate::naming::column_names;
use crate::results::{Record, ResultSet, rows_to_records};
use crate::types::RowValues;

static PARAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}_#][\p{L}\p{N}_@#$]*$").expect("valid regex"));
static PROCEDURE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\[[^\]]+\]|[\p{L}_#][\p{L}\p{N}_@#$]*)(?:\.(?:\[[^\]]+\]|[\p{L}_#][\p{L}\p{N}_@#$]*)){0,3}$",
    )
    .expect("valid regex")
});

/// How input arguments are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgBinding {
    /// Every non-null argument is sent as its text form and SQL Server
    /// converts it to the declared parameter type. Lossy for floats and
    /// timestamps; this is the historical behaviour callers depend on.
    /// Binary values stay binary, since NVARCHAR never converts implicitly
    /// to VARBINARY.
    #[default]
    Text,
    /// Arguments keep their native types.
    Native,
}

/// A stored procedure invocation.
///
/// ```rust
/// use mssql_db::prelude::*;
///
/// let call = ProcedureCall::new("dbo.usp_LoadOrders")
///     .arg("Region", RowValues::Text("EMEA".into()))
///     .arg("Limit", RowValues::Int(50))
///     .out_arg("RowCount");
/// assert_eq!(
///     call.statement().unwrap(),
///     "DECLARE @rowcount INTEGER;EXEC @rowcount = dbo.usp_LoadOrders @Region = ?, @Limit = ?;SELECT @rowcount AS rowcount;"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ProcedureCall {
    name: String,
    args: Vec<(String, RowValues)>,
    out_arg: Option<String>,
    as_dict: bool,
    binding: ArgBinding,
}

impl ProcedureCall {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            out_arg: None,
            as_dict: true,
            binding: ArgBinding::default(),
        }
    }

    /// Add a named input argument. Order is preserved.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, value: RowValues) -> Self {
        self.args.push((name.into(), value));
        self
    }

    #[must_use]
    pub fn args<I, K>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = (K, RowValues)>,
        K: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Capture the procedure's return value under this (lowercased) name.
    #[must_use]
    pub fn out_arg(mut self, name: impl AsRef<str>) -> Self {
        self.out_arg = Some(name.as_ref().to_lowercase());
        self
    }

    /// `false` returns column names and raw rows instead of records.
    #[must_use]
    pub fn as_dict(mut self, as_dict: bool) -> Self {
        self.as_dict = as_dict;
        self
    }

    #[must_use]
    pub fn binding(mut self, binding: ArgBinding) -> Self {
        self.binding = binding;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn out_arg_name(&self) -> Option<&str> {
        self.out_arg.as_deref()
    }

    #[must_use]
    pub fn is_as_dict(&self) -> bool {
        self.as_dict
    }

    /// The T-SQL batch that performs the call, with `?` for each argument.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ParameterError` if the procedure, an argument
    /// or the out argument is not a valid identifier.
    pub fn statement(&self) -> Result<String, MssqlDbError> {
        if !PROCEDURE_NAME.is_match(&self.name) {
            return Err(MssqlDbError::ParameterError(format!(
                "invalid stored procedure name {:?}",
                self.name
            )));
        }
        for name in self
            .args
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(self.out_arg.as_deref())
        {
            if !PARAM_NAME.is_match(name) {
                return Err(MssqlDbError::ParameterError(format!(
                    "invalid parameter name {name:?}"
                )));
            }
        }

        let mut sql = String::new();
        match &self.out_arg {
            Some(out) => {
                let _ = write!(sql, "DECLARE @{out} INTEGER;EXEC @{out} = {} ", self.name);
            }
            None => {
                let _ = write!(sql, "EXEC {} ", self.name);
            }
        }
        for (key, _) in &self.args {
            let _ = write!(sql, "@{key} = ?, ");
        }
        let trimmed = sql.trim_end_matches([',', ' ']).len();
        sql.truncate(trimmed);
        sql.push(';');
        if let Some(out) = &self.out_arg {
            let _ = write!(sql, "SELECT @{out} AS {out};");
        }
        Ok(sql)
    }

    /// Argument values in statement order, converted per [`ArgBinding`].
    #[must_use]
    pub fn bound_params(&self) -> Vec<RowValues> {
        self.args
            .iter()
            .map(|(_, value)| match (self.binding, value) {
                (ArgBinding::Native, _) | (ArgBinding::Text, RowValues::Blob(_)) => value.clone(),
                (ArgBinding::Text, _) => value
                    .to_param_text()
                    .map_or(RowValues::Null, RowValues::Text),
            })
            .collect()
    }
}

/// One entry of a stored procedure's output.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedSet {
    /// A result set mapped to records.
    Records(ResultSet),
    /// Normalized column names of the raw rows that follow (`as_dict == false`).
    Columns(Vec<String>),
    /// Raw rows: either after a `Columns` entry, or a batch that carried no
    /// column metadata at all.
    Rows(Vec<Vec<RowValues>>),
}

impl CapturedSet {
    #[must_use]
    pub fn as_records(&self) -> Option<&ResultSet> {
        match self {
            CapturedSet::Records(set) => Some(set),
            _ => None,
        }
    }
}

/// Walk every batch and shape it the way the caller asked.
pub(crate) fn capture(
    mut batches: ResultBatches,
    as_dict: bool,
) -> Result<Vec<CapturedSet>, MssqlDbError> {
    let mut sets = Vec::with_capacity(batches.len());
    while batches.has_more() {
        let Some(batch) = batches.next_batch() else {
            break;
        };
        if !batch.has_columns() {
            sets.push(CapturedSet::Rows(batch.rows.clone()));
            continue;
        }
        let names = column_names(&batch.columns);
        if as_dict {
            sets.push(CapturedSet::Records(rows_to_records(
                &names,
                batch.rows.clone(),
            )?));
        } else {
            sets.push(CapturedSet::Columns(names));
            sets.push(CapturedSet::Rows(batch.rows.clone()));
        }
    }
    Ok(sets)
}

/// Everything a stored procedure call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureResults {
    sets: Vec<CapturedSet>,
    out_arg: Option<String>,
}

impl ProcedureResults {
    #[must_use]
    pub fn new(sets: Vec<CapturedSet>, out_arg: Option<String>) -> Self {
        Self { sets, out_arg }
    }

    #[must_use]
    pub fn sets(&self) -> &[CapturedSet] {
        &self.sets
    }

    #[must_use]
    pub fn into_sets(self) -> Vec<CapturedSet> {
        self.sets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    #[must_use]
    pub fn out_arg(&self) -> Option<&str> {
        self.out_arg.as_deref()
    }

    /// See [`get_result_set`].
    #[must_use]
    pub fn result_set(&self, index: usize) -> Option<&CapturedSet> {
        get_result_set(&self.sets, index, self.out_arg.as_deref())
    }

    /// See [`get_first_result_set`].
    #[must_use]
    pub fn first_record(&self) -> Option<&Record> {
        get_first_result_set(&self.sets, self.out_arg.as_deref())
    }

    /// The out argument's value.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::MissingOutArgument` if it was not captured, or
    /// `MssqlDbError::ParameterError` if the call never asked for one.
    pub fn out_value(&self) -> Result<&RowValues, MssqlDbError> {
        match &self.out_arg {
            Some(out) => get_out_value(&self.sets, out),
            None => Err(MssqlDbError::ParameterError(
                "the procedure call did not request an out argument".to_string(),
            )),
        }
    }
}
