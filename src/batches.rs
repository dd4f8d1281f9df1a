//! Raw statement output as a finite, restartable sequence of batches.
//!
//! A batch of SQL (or a stored procedure) can produce several result sets.
//! The driver streams them back; sessions collect them into
//! [`ResultBatches`] so callers walk them with an explicit `has_more` check.

use crate::types::RowValues;

/// One statement's raw output: the column names exactly as the server
/// described them, and the rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RowValues>>,
}

impl ResultBatch {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builder-style row append, handy for scripted sessions in tests.
    #[must_use]
    pub fn with_row(mut self, row: Vec<RowValues>) -> Self {
        self.rows.push(row);
        self
    }

    /// Statements such as row-count echoes come back without column metadata.
    #[must_use]
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// Every batch produced by one round trip, with a read cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBatches {
    batches: Vec<ResultBatch>,
    cursor: usize,
}

impl ResultBatches {
    #[must_use]
    pub fn new(batches: Vec<ResultBatch>) -> Self {
        Self { batches, cursor: 0 }
    }

    /// True while [`next_batch`](Self::next_batch) would return a batch.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.cursor < self.batches.len()
    }

    /// Advance to the next batch.
    pub fn next_batch(&mut self) -> Option<&ResultBatch> {
        let batch = self.batches.get(self.cursor)?;
        self.cursor += 1;
        Some(batch)
    }

    /// Move the cursor back to the first batch.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Drop everything but the first batch.
    #[must_use]
    pub fn into_first(self) -> Option<ResultBatch> {
        self.batches.into_iter().next()
    }

    pub(crate) fn push(&mut self, batch: ResultBatch) {
        self.batches.push(batch);
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut ResultBatch> {
        self.batches.last_mut()
    }
}

impl From<Vec<ResultBatch>> for ResultBatches {
    fn from(batches: Vec<ResultBatch>) -> Self {
        Self::new(batches)
    }
}
