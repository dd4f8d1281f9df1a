use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::RowValues;

/// Column names shared by every record of one result set, with a
/// name → position lookup built once per set.
#[derive(Debug)]
pub(crate) struct ColumnIndex {
    names: Vec<String>,
    // later duplicates overwrite earlier ones, like a dict built from pairs
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub(crate) fn new(names: Vec<String>) -> Self {
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, positions }
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// One row keyed by normalized column name.
///
/// Iteration follows column order. When two columns normalize to the same
/// name the key appears once, at its first position, holding the value of
/// the last such column.
#[derive(Debug, Clone)]
pub struct Record {
    columns: Arc<ColumnIndex>,
    values: Vec<RowValues>,
}

impl Record {
    /// Callers guarantee `values.len() == columns.names().len()`.
    pub(crate) fn from_parts(columns: Arc<ColumnIndex>, values: Vec<RowValues>) -> Self {
        Self { columns, values }
    }

    /// Get a value by normalized column name.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.columns
            .position(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn contains_key(&self, column_name: &str) -> bool {
        self.columns.position(column_name).is_some()
    }

    /// Get a value by column position, ignoring names.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    /// Column names as described by the driver, after normalization.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    /// Raw values in column order.
    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Key/value pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        let mut seen = HashSet::new();
        self.columns.names().iter().filter_map(move |name| {
            if !seen.insert(name.as_str()) {
                return None;
            }
            self.get(name).map(|value| (name.as_str(), value))
        })
    }

    /// Render the record as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(k, v)| (k.to_string(), serde_json::to_value(v).unwrap_or_default()))
                .collect(),
        )
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.columns.names() == other.columns.names() && self.values == other.values
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
