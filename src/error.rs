use thiserror::Error;

#[derive(Debug, Error)]
pub enum MssqlDbError {
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Row has {values} values but {columns} columns were described")]
    ShapeMismatch { columns: usize, values: usize },

    #[error("The out argument \"{0}\" was not captured from call to the stored procedure.")]
    MissingOutArgument(String),
}

impl MssqlDbError {
    /// True when the error reports a stored procedure that did not hand back its out argument.
    #[must_use]
    pub fn is_missing_out_argument(&self) -> bool {
        matches!(self, Self::MissingOutArgument(_))
    }
}
