//! Records and result sets, plus the helpers that shape raw driver rows
//! into them.

mod record;
mod result_set;

pub use record::Record;
pub use result_set::ResultSet;

use std::sync::Arc;

use record::ColumnIndex;

use crate::error::MssqlDbError;
use crate::types::RowValues;

/// Zip normalized column names with one row's values.
///
/// # Errors
///
/// Returns `MssqlDbError::ShapeMismatch` if `columns.len() != row.len()`.
pub fn row_to_record(columns: &[String], row: Vec<RowValues>) -> Result<Record, MssqlDbError> {
    if columns.len() != row.len() {
        return Err(MssqlDbError::ShapeMismatch {
            columns: columns.len(),
            values: row.len(),
        });
    }
    let index = Arc::new(ColumnIndex::new(columns.to_vec()));
    Ok(Record::from_parts(index, row))
}

/// Map every row to a record, preserving row order.
///
/// # Errors
///
/// Returns `MssqlDbError::ShapeMismatch` on the first row whose width
/// differs from the column count.
pub fn rows_to_records(
    columns: &[String],
    rows: Vec<Vec<RowValues>>,
) -> Result<ResultSet, MssqlDbError> {
    let mut result_set = ResultSet::with_columns(columns.to_vec());
    for row in rows {
        result_set.push_row(row)?;
    }
    Ok(result_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn zips_columns_with_values() {
        let record = row_to_record(
            &cols(&["user_id", "name"]),
            vec![RowValues::Int(7), RowValues::Text("ada".into())],
        )
        .unwrap();

        assert_eq!(record.get("user_id"), Some(&RowValues::Int(7)));
        assert_eq!(record.get("name").and_then(RowValues::as_text), Some("ada"));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn rejects_mismatched_width() {
        let err = row_to_record(&cols(&["a", "b"]), vec![RowValues::Null]).unwrap_err();
        assert!(matches!(
            err,
            MssqlDbError::ShapeMismatch {
                columns: 2,
                values: 1
            }
        ));
    }

    #[test]
    fn empty_rows_make_empty_set() {
        let set = rows_to_records(&[], Vec::new()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.first(), None);
    }

    #[test]
    fn preserves_row_order() {
        let set = rows_to_records(
            &cols(&["n"]),
            (1..=3).map(|i| vec![RowValues::Int(i)]).collect(),
        )
        .unwrap();
        let ns: Vec<i64> = set
            .iter()
            .filter_map(|r| r.get("n").and_then(RowValues::as_int).copied())
            .collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_names_keep_first_position_and_last_value() {
        let record = row_to_record(
            &cols(&["id", "name", "id"]),
            vec![
                RowValues::Int(1),
                RowValues::Text("x".into()),
                RowValues::Int(2),
            ],
        )
        .unwrap();

        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "name"]);
        assert_eq!(record.get("id"), Some(&RowValues::Int(2)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn records_serialize_as_objects() {
        let set = rows_to_records(
            &cols(&["id", "label"]),
            vec![vec![RowValues::Int(1), RowValues::Null]],
        )
        .unwrap();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!([{ "id": 1, "label": null }]));
        assert_eq!(
            set.first().map(Record::to_json),
            Some(serde_json::json!({ "id": 1, "label": null }))
        );
    }
}
