//! Schema validator for batch rows
//!
//! Validation semantics:
//! - Strict order: row key sequence equals the schema sequence
//! - Unordered: row key set equals the schema key set
//! - Extra keys and missing keys both fail under either policy
//! - Sequences stop at the first failing row
//!
//! The validator never mutates rows.

use std::collections::HashSet;

use super::policy::ValidationPolicy;
use crate::errors::{format_schema, BatchError, BatchResult};
use crate::value::{FieldValue, RowLike};

const OWNER: &str = "SchemaValidator";

/// Validates rows against a fixed, ordered column schema.
///
/// The schema is copied at construction and never changes afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidator {
    schema: Vec<String>,
    policy: ValidationPolicy,
}

impl SchemaValidator {
    /// Creates a validator from column names and a policy.
    ///
    /// # Errors
    ///
    /// - BATCH_EMPTY_SCHEMA if no columns are given
    /// - BATCH_DUPLICATE_COLUMN if a column is named twice
    pub fn new<I, S>(schema: I, policy: impl Into<ValidationPolicy>) -> BatchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema: Vec<String> = schema.into_iter().map(Into::into).collect();
        if schema.is_empty() {
            return Err(BatchError::empty_schema(OWNER));
        }

        let mut seen = HashSet::with_capacity(schema.len());
        for column in &schema {
            if !seen.insert(column.as_str()) {
                return Err(BatchError::duplicate_column(OWNER, column));
            }
        }

        Ok(Self {
            schema,
            policy: policy.into(),
        })
    }

    /// Creates a strict-order validator.
    pub fn strict<I, S>(schema: I) -> BatchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(schema, ValidationPolicy::strict())
    }

    /// Ordered column names.
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Alias for [`schema`](Self::schema).
    pub fn columns(&self) -> &[String] {
        &self.schema
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn strict_order(&self) -> bool {
        self.policy.strict_order
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.iter().any(|column| column == name)
    }

    /// Validates a single row.
    ///
    /// # Errors
    ///
    /// BATCH_SCHEMA_MISMATCH if the row's keys do not satisfy the policy.
    pub fn validate_row<R: RowLike + ?Sized>(&self, row: &R) -> BatchResult<()> {
        let keys = row.column_names();

        let matches = if self.policy.strict_order {
            keys.len() == self.schema.len()
                && keys.iter().zip(&self.schema).all(|(k, s)| *k == s.as_str())
        } else {
            let expected: HashSet<&str> = self.schema.iter().map(String::as_str).collect();
            let actual: HashSet<&str> = keys.iter().copied().collect();
            expected == actual
        };

        if matches {
            return Ok(());
        }

        let message = if self.policy.strict_order {
            "SchemaValidator: row keys do not match schema order"
        } else {
            "SchemaValidator: row key set does not match schema"
        };
        let actual: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        Err(BatchError::schema_mismatch(
            message,
            format_schema(&self.schema),
            format_schema(&actual),
        ))
    }

    /// Validates rows in order, stopping at the first failure.
    ///
    /// The failing row's index is attached to the error.
    pub fn validate_rows<R: RowLike>(&self, rows: &[R]) -> BatchResult<()> {
        for (idx, row) in rows.iter().enumerate() {
            self.validate_row(row).map_err(|e| e.at_row(idx))?;
        }
        Ok(())
    }

    /// Validates a dynamically typed row.
    ///
    /// # Errors
    ///
    /// BATCH_ROW_SHAPE if the value is not a mapping, otherwise as
    /// [`validate_row`](Self::validate_row).
    pub fn validate_value(&self, row: &FieldValue) -> BatchResult<()> {
        match row {
            FieldValue::Map(map) => self.validate_row(map),
            other => Err(BatchError::row_shape(OWNER, other.type_name())),
        }
    }

    /// Validates a dynamically typed sequence of rows.
    ///
    /// # Errors
    ///
    /// BATCH_ROWS_SHAPE if the value is not a list; otherwise the first
    /// failing element's error, tagged with its index.
    pub fn validate_values(&self, rows: &FieldValue) -> BatchResult<()> {
        let items = rows
            .as_list()
            .ok_or_else(|| BatchError::rows_shape(OWNER, rows.type_name()))?;

        for (idx, row) in items.iter().enumerate() {
            self.validate_value(row).map_err(|e| e.at_row(idx))?;
        }
        Ok(())
    }

    pub fn is_valid_row<R: RowLike + ?Sized>(&self, row: &R) -> bool {
        absorb(self.validate_row(row))
    }

    pub fn is_valid_rows<R: RowLike>(&self, rows: &[R]) -> bool {
        absorb(self.validate_rows(rows))
    }

    pub fn is_valid_value(&self, row: &FieldValue) -> bool {
        absorb(self.validate_value(row))
    }

    pub fn is_valid_values(&self, rows: &FieldValue) -> bool {
        absorb(self.validate_values(rows))
    }
}

/// Maps shape and content failures to `false`.
///
/// Validation raises no other category.
fn absorb(result: BatchResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug_assert!(
                e.is_shape() || e.is_content(),
                "schema validation raised unexpected error: {}",
                e
            );
            false
        }
    }
}
