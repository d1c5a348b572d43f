//! Batch indexing
//!
//! An index is one of three explicit variants, each with its own handler.
//! Dynamically typed indexes are mapped onto the variants up front.

use std::ops::Range;

use crate::errors::{BatchError, BatchResult};
use crate::value::{FieldValue, Row};

/// How to read from a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchIndex {
    /// Single row; negative positions count from the end
    Position(isize),
    /// Half-open row range `[start, end)`, clamped to the batch length
    Range(usize, usize),
    /// All values of one column, in row order
    Column(String),
}

impl BatchIndex {
    /// Maps a dynamic value onto an index variant.
    ///
    /// Integers select positions, strings select columns, a two-element
    /// list of non-negative integers selects a range.
    ///
    /// # Errors
    ///
    /// BATCH_INDEX_TYPE for any other value.
    pub fn from_value(value: &FieldValue, owner: &str) -> BatchResult<Self> {
        match value {
            FieldValue::Integer(pos) => isize::try_from(*pos)
                .map(BatchIndex::Position)
                .map_err(|_| BatchError::position_out_of_range(owner, isize::MAX, 0)),
            FieldValue::String(name) => Ok(BatchIndex::Column(name.clone())),
            FieldValue::List(items) => match items.as_slice() {
                [FieldValue::Integer(start), FieldValue::Integer(end)]
                    if *start >= 0 && *end >= 0 =>
                {
                    Ok(BatchIndex::Range(*start as usize, *end as usize))
                }
                _ => Err(BatchError::index_type(owner, "list")),
            },
            other => Err(BatchError::index_type(owner, other.type_name())),
        }
    }
}

impl From<isize> for BatchIndex {
    fn from(pos: isize) -> Self {
        BatchIndex::Position(pos)
    }
}

impl From<Range<usize>> for BatchIndex {
    fn from(range: Range<usize>) -> Self {
        BatchIndex::Range(range.start, range.end)
    }
}

impl From<&str> for BatchIndex {
    fn from(name: &str) -> Self {
        BatchIndex::Column(name.to_string())
    }
}

impl From<String> for BatchIndex {
    fn from(name: String) -> Self {
        BatchIndex::Column(name)
    }
}

impl TryFrom<&FieldValue> for BatchIndex {
    type Error = BatchError;

    fn try_from(value: &FieldValue) -> Result<Self, Self::Error> {
        BatchIndex::from_value(value, "batch")
    }
}

/// Result of indexing a batch; one variant per `BatchIndex` variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a, B> {
    Row(&'a Row),
    Slice(B),
    Column(Vec<&'a FieldValue>),
}

impl<'a, B> Selection<'a, B> {
    pub fn into_row(self) -> Option<&'a Row> {
        match self {
            Selection::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn into_slice(self) -> Option<B> {
        match self {
            Selection::Slice(batch) => Some(batch),
            _ => None,
        }
    }

    pub fn into_column(self) -> Option<Vec<&'a FieldValue>> {
        match self {
            Selection::Column(values) => Some(values),
            _ => None,
        }
    }
}

/// Resolves a possibly negative position against `len`.
pub(crate) fn resolve_position(position: isize, len: usize) -> Option<usize> {
    let resolved = if position < 0 {
        len.checked_sub(position.unsigned_abs())?
    } else {
        position as usize
    };
    (resolved < len).then_some(resolved)
}

/// Clamps a half-open range to `len`. Inverted ranges are empty.
pub(crate) fn clamp_range(start: usize, end: usize, len: usize) -> Range<usize> {
    let end = end.min(len);
    let start = start.min(end);
    start..end
}
