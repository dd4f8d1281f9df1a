use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::TryStreamExt;
use tiberius::{ColumnData, FromSql, Query, QueryItem, Row};

use super::config::MssqlClient;
use crate::batches::{ResultBatch, ResultBatches};
use crate::error::MssqlDbError;
use crate::types::RowValues;

/// Run a statement batch and drain every result set the server returns.
///
/// # Errors
///
/// Driver errors propagate unchanged; a row arriving before any column
/// metadata or an unsupported column type is an `ExecutionError`.
pub async fn run_batches(
    client: &mut MssqlClient,
    query: &str,
    params: &[RowValues],
) -> Result<ResultBatches, MssqlDbError> {
    let query_builder = bind_query_params(query, params);
    let mut stream = query_builder.query(client).await?;

    let mut batches = ResultBatches::default();
    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) => {
                let columns = meta
                    .columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect();
                batches.push(ResultBatch::new(columns));
            }
            QueryItem::Row(row) => {
                let batch = batches.last_mut().ok_or_else(|| {
                    MssqlDbError::ExecutionError(
                        "row received before column metadata".to_string(),
                    )
                })?;
                batch.rows.push(extract_row(row)?);
            }
        }
    }

    Ok(batches)
}

fn extract_row(row: Row) -> Result<Vec<RowValues>, MssqlDbError> {
    row.into_iter().map(extract_value).collect()
}

/// Convert one cell into a `RowValues`.
fn extract_value(data: ColumnData<'static>) -> Result<RowValues, MssqlDbError> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(RowValues::Int),
        ColumnData::F32(v) => v.map(|v| RowValues::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(RowValues::Float),
        ColumnData::Bit(v) => v.map(RowValues::Bool),
        ColumnData::String(v) => v.map(|s| RowValues::Text(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| RowValues::Text(g.to_string().to_uppercase())),
        ColumnData::Binary(v) => v.map(|b| RowValues::Blob(b.into_owned())),
        ColumnData::Numeric(v) => match v {
            Some(n) => Some(RowValues::Float(n.to_string().parse::<f64>().map_err(|e| {
                MssqlDbError::ExecutionError(format!("cannot read numeric {n}: {e}"))
            })?)),
            None => None,
        },
        ColumnData::Xml(v) => v.map(|x| RowValues::Text(x.into_owned().into_string())),
        other => temporal_value(&other)?,
    };

    Ok(value.unwrap_or(RowValues::Null))
}

/// Date and time columns, which the driver only exposes through `FromSql`.
fn temporal_value(data: &ColumnData<'static>) -> Result<Option<RowValues>, MssqlDbError> {
    if let Ok(v) = NaiveDateTime::from_sql(data) {
        return Ok(v.map(RowValues::Timestamp));
    }
    if let Ok(v) = NaiveDate::from_sql(data) {
        return Ok(v.map(RowValues::Date));
    }
    if let Ok(v) = NaiveTime::from_sql(data) {
        return Ok(v.map(RowValues::Time));
    }
    if let Ok(v) = DateTime::<FixedOffset>::from_sql(data) {
        return Ok(v.map(|dt| RowValues::Timestamp(dt.naive_utc())));
    }
    Err(MssqlDbError::ExecutionError(format!(
        "unsupported SQL Server column value: {data:?}"
    )))
}

/// Bind parameters directly to the query for SQL Server
/// Return a query builder with parameters already bound
pub fn bind_query_params<'a>(query: &'a str, params: &[RowValues]) -> Query<'a> {
    let mut query_builder = Query::new(query);

    for param in params {
        match param {
            RowValues::Int(i) => query_builder.bind(*i),
            RowValues::Float(f) => query_builder.bind(*f),
            RowValues::Text(s) => query_builder.bind(s.clone()),
            RowValues::Bool(b) => query_builder.bind(*b),
            RowValues::Timestamp(dt) => query_builder.bind(*dt),
            RowValues::Date(d) => query_builder.bind(*d),
            RowValues::Time(t) => query_builder.bind(*t),
            RowValues::Blob(bytes) => query_builder.bind(bytes.clone()),
            RowValues::Null => query_builder.bind(Option::<String>::None),
        }
    }

    query_builder
}
