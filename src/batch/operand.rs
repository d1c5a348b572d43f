//! Concatenation operands
//!
//! Each batch kind accepts a fixed set of operand shapes and reports every
//! other shape as BATCH_UNSUPPORTED_OPERAND.

use super::shard::ShardBatch;
use super::window::WindowBatch;
use crate::value::{FieldValue, Row};

/// Right-hand side of a batch concatenation.
#[derive(Debug, Clone, Copy)]
pub enum BatchOperand<'a> {
    Shard(&'a ShardBatch),
    Window(&'a WindowBatch),
    Rows(&'a [Row]),
    /// Dynamically typed operand, typically a list of maps
    Value(&'a FieldValue),
}

impl<'a> BatchOperand<'a> {
    /// Operand description for error messages
    pub fn describe(&self) -> String {
        match self {
            BatchOperand::Shard(_) => "ShardBatch".to_string(),
            BatchOperand::Window(_) => "WindowBatch".to_string(),
            BatchOperand::Rows(_) => "row sequence".to_string(),
            BatchOperand::Value(value) => value.type_name().to_string(),
        }
    }
}

impl<'a> From<&'a ShardBatch> for BatchOperand<'a> {
    fn from(batch: &'a ShardBatch) -> Self {
        BatchOperand::Shard(batch)
    }
}

impl<'a> From<&'a WindowBatch> for BatchOperand<'a> {
    fn from(batch: &'a WindowBatch) -> Self {
        BatchOperand::Window(batch)
    }
}

impl<'a> From<&'a [Row]> for BatchOperand<'a> {
    fn from(rows: &'a [Row]) -> Self {
        BatchOperand::Rows(rows)
    }
}

impl<'a> From<&'a Vec<Row>> for BatchOperand<'a> {
    fn from(rows: &'a Vec<Row>) -> Self {
        BatchOperand::Rows(rows.as_slice())
    }
}

impl<'a> From<&'a FieldValue> for BatchOperand<'a> {
    fn from(value: &'a FieldValue) -> Self {
        BatchOperand::Value(value)
    }
}
