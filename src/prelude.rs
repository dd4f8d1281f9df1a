//! Convenient imports for common functionality.

pub use crate::batches::{ResultBatch, ResultBatches};
pub use crate::config::{DbConfig, DbConfigBuilder, ServerAddress};
pub use crate::database::Database;
pub use crate::error::MssqlDbError;
pub use crate::mssql::{MssqlConnector, MssqlSession};
pub use crate::naming::normalize;
pub use crate::procedure::{
    ArgBinding, CapturedSet, ProcedureCall, ProcedureResults, get_first_result_set,
    get_out_value, get_result_set,
};
pub use crate::results::{Record, ResultSet, row_to_record, rows_to_records};
pub use crate::session::{Connector, Session};
pub use crate::types::RowValues;
