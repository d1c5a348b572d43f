//! Row and cell value model
//!
//! - `FieldValue`: tagged cell value, no implicit coercion
//! - `Row`: ordered column-to-value mapping
//! - `RowLike`: capability interface for mapping-like row input

mod field_value;
mod row;

pub use field_value::{FieldValue, ValueKind};
pub use row::{Row, RowLike};
