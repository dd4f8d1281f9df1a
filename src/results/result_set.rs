use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::record::{ColumnIndex, Record};
use crate::error::MssqlDbError;
use crate::types::RowValues;

/// The records produced by one statement.
///
/// Always present: a statement that matched nothing is an empty set, not
/// a missing one.
#[derive(Debug, Clone)]
pub struct ResultSet {
    columns: Arc<ColumnIndex>,
    records: Vec<Record>,
}

impl Default for ResultSet {
    fn default() -> Self {
        Self {
            columns: Arc::new(ColumnIndex::new(Vec::new())),
            records: Vec::new(),
        }
    }
}

impl ResultSet {
    /// Create an empty result set for the given (already normalized) columns.
    #[must_use]
    pub fn with_columns(column_names: Vec<String>) -> Self {
        Self {
            columns: Arc::new(ColumnIndex::new(column_names)),
            records: Vec::new(),
        }
    }

    /// Column names shared by all records in this set.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    /// Append one row.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ShapeMismatch` when the row width differs from
    /// the column count.
    pub fn push_row(&mut self, row: Vec<RowValues>) -> Result<(), MssqlDbError> {
        let columns = self.columns.names().len();
        if row.len() != columns {
            return Err(MssqlDbError::ShapeMismatch {
                columns,
                values: row.len(),
            });
        }
        self.records
            .push(Record::from_parts(Arc::clone(&self.columns), row));
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl PartialEq for ResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.column_names() == other.column_names() && self.records == other.records
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
