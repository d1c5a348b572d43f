//! Shared read contract for immutable row batches
//!
//! Both batch kinds store validated row copies and hand them out only by
//! shared reference, for iteration and indexing alike. Owned copies are
//! available through `row_owned`. Every row-producing operation returns a
//! new batch.

use std::slice;

use super::index::{clamp_range, resolve_position, BatchIndex, Selection};
use crate::errors::{BatchError, BatchResult};
use crate::value::{FieldValue, Row};

/// Immutable, validated row container.
pub trait RowContainer: Sized {
    /// Name used in errors and logs
    const KIND: &'static str;

    /// Stored rows in order
    fn rows(&self) -> &[Row];

    /// Ordered column names
    fn schema(&self) -> &[String];

    /// Builds a batch with this batch's partition metadata over `rows`,
    /// which are taken from this batch.
    fn with_rows(&self, rows: Vec<Row>) -> BatchResult<Self>;

    /// Alias for [`schema`](Self::schema).
    fn columns(&self) -> &[String] {
        self.schema()
    }

    fn len(&self) -> usize {
        self.rows().len()
    }

    fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    fn iter(&self) -> slice::Iter<'_, Row> {
        self.rows().iter()
    }

    /// Row at `position`; negative positions count from the end.
    fn row(&self, position: isize) -> BatchResult<&Row> {
        resolve_position(position, self.len())
            .map(|idx| &self.rows()[idx])
            .ok_or_else(|| BatchError::position_out_of_range(Self::KIND, position, self.len()))
    }

    /// Owned copy of the row at `position`.
    fn row_owned(&self, position: isize) -> BatchResult<Row> {
        self.row(position).cloned()
    }

    /// Values of one column across all rows, in row order.
    fn column(&self, name: &str) -> BatchResult<Vec<&FieldValue>> {
        if !self.has_column(name) {
            return Err(BatchError::unknown_column(Self::KIND, name, self.schema()));
        }
        Ok(self.rows().iter().filter_map(|row| row.get(name)).collect())
    }

    fn has_column(&self, name: &str) -> bool {
        self.schema().iter().any(|column| column == name)
    }

    /// Membership is defined over column names only; non-string probes are
    /// never members.
    fn contains(&self, probe: &FieldValue) -> bool {
        probe.as_str().is_some_and(|name| self.has_column(name))
    }

    /// New batch over rows `[start, end)`, clamped to the batch length.
    fn slice(&self, start: usize, end: usize) -> BatchResult<Self> {
        let range = clamp_range(start, end, self.len());
        self.with_rows(self.rows()[range].to_vec())
    }

    fn get(&self, index: BatchIndex) -> BatchResult<Selection<'_, Self>> {
        match index {
            BatchIndex::Position(position) => self.row(position).map(Selection::Row),
            BatchIndex::Range(start, end) => self.slice(start, end).map(Selection::Slice),
            BatchIndex::Column(name) => self.column(&name).map(Selection::Column),
        }
    }

    /// Indexes with a dynamically typed value.
    ///
    /// # Errors
    ///
    /// BATCH_INDEX_TYPE if the value is not an integer, a column name or a
    /// two-element range.
    fn get_by_value(&self, index: &FieldValue) -> BatchResult<Selection<'_, Self>> {
        self.get(BatchIndex::from_value(index, Self::KIND)?)
    }
}
