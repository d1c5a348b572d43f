//! Error types for the batch validation layer
//!
//! Error codes:
//! - BATCH_EMPTY_SCHEMA (CONFIG)
//! - BATCH_DUPLICATE_COLUMN (CONFIG)
//! - BATCH_MISSING_TIMESTAMP_COLUMN (CONFIG)
//! - BATCH_WINDOW_KIND_MISMATCH (SHAPE)
//! - BATCH_WINDOW_NOT_INCREASING (CONFIG)
//! - BATCH_ROW_SHAPE (SHAPE)
//! - BATCH_ROWS_SHAPE (SHAPE)
//! - BATCH_TIMESTAMP_TYPE (SHAPE)
//! - BATCH_INDEX_TYPE (SHAPE)
//! - BATCH_SCHEMA_MISMATCH (CONTENT)
//! - BATCH_MISSING_FIELD (CONTENT)
//! - BATCH_PARTITION_MISMATCH (CONTENT)
//! - BATCH_TIMESTAMP_INVALID (CONTENT)
//! - BATCH_OUT_OF_WINDOW (CONTENT)
//! - BATCH_WINDOW_MISMATCH (CONTENT)
//! - BATCH_POLICY_MISMATCH (CONTENT)
//! - BATCH_UNKNOWN_COLUMN (LOOKUP)
//! - BATCH_POSITION_OUT_OF_RANGE (LOOKUP)
//! - BATCH_UNSUPPORTED_OPERAND (UNSUPPORTED)
//!
//! Every error aborts the operation that raised it. Nothing is retried.

use std::fmt;

/// Broad failure categories.
///
/// `Shape` means "wrong kind of input", `Content` means "right kind,
/// wrong content". The boolean validity checks only ever absorb these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid construction parameters (schema, window bounds)
    Config,
    /// Input of the wrong kind (not a mapping, not a sequence, bad index)
    Shape,
    /// Input of the right kind with invalid content
    Content,
    /// Lookup of a column or position that does not exist
    Lookup,
    /// Operand combination not supported by the receiver
    Unsupported,
}

impl ErrorCategory {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Config => "CONFIG",
            ErrorCategory::Shape => "SHAPE",
            ErrorCategory::Content => "CONTENT",
            ErrorCategory::Lookup => "LOOKUP",
            ErrorCategory::Unsupported => "UNSUPPORTED",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Batch error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchErrorCode {
    /// Schema has no columns
    EmptySchema,
    /// Schema names a column twice
    DuplicateColumn,
    /// Window schema lacks the timestamp column
    MissingTimestampColumn,
    /// Window bounds supplied as different kinds of value
    WindowKindMismatch,
    /// Window start is not strictly below window end
    WindowNotIncreasing,
    /// Row is not a mapping
    RowShape,
    /// Rows are not a sequence
    RowsShape,
    /// Timestamp value has an unsupported type
    TimestampType,
    /// Index value has an unsupported type
    IndexType,
    /// Row keys differ from the schema
    SchemaMismatch,
    /// Row lacks a required field
    MissingField,
    /// Row partition key differs from the batch partition key
    PartitionMismatch,
    /// Timestamp value is absent, zero or non-finite
    TimestampInvalid,
    /// Timestamp outside the half-open window
    OutOfWindow,
    /// Window ranges differ between batches
    WindowMismatch,
    /// Validation policies differ between batches
    PolicyMismatch,
    /// Column not in schema
    UnknownColumn,
    /// Row position out of range
    PositionOutOfRange,
    /// Operand not accepted by the receiver
    UnsupportedOperand,
}

impl BatchErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            BatchErrorCode::EmptySchema => "BATCH_EMPTY_SCHEMA",
            BatchErrorCode::DuplicateColumn => "BATCH_DUPLICATE_COLUMN",
            BatchErrorCode::MissingTimestampColumn => "BATCH_MISSING_TIMESTAMP_COLUMN",
            BatchErrorCode::WindowKindMismatch => "BATCH_WINDOW_KIND_MISMATCH",
            BatchErrorCode::WindowNotIncreasing => "BATCH_WINDOW_NOT_INCREASING",
            BatchErrorCode::RowShape => "BATCH_ROW_SHAPE",
            BatchErrorCode::RowsShape => "BATCH_ROWS_SHAPE",
            BatchErrorCode::TimestampType => "BATCH_TIMESTAMP_TYPE",
            BatchErrorCode::IndexType => "BATCH_INDEX_TYPE",
            BatchErrorCode::SchemaMismatch => "BATCH_SCHEMA_MISMATCH",
            BatchErrorCode::MissingField => "BATCH_MISSING_FIELD",
            BatchErrorCode::PartitionMismatch => "BATCH_PARTITION_MISMATCH",
            BatchErrorCode::TimestampInvalid => "BATCH_TIMESTAMP_INVALID",
            BatchErrorCode::OutOfWindow => "BATCH_OUT_OF_WINDOW",
            BatchErrorCode::WindowMismatch => "BATCH_WINDOW_MISMATCH",
            BatchErrorCode::PolicyMismatch => "BATCH_POLICY_MISMATCH",
            BatchErrorCode::UnknownColumn => "BATCH_UNKNOWN_COLUMN",
            BatchErrorCode::PositionOutOfRange => "BATCH_POSITION_OUT_OF_RANGE",
            BatchErrorCode::UnsupportedOperand => "BATCH_UNSUPPORTED_OPERAND",
        }
    }

    /// Returns the category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            BatchErrorCode::EmptySchema
            | BatchErrorCode::DuplicateColumn
            | BatchErrorCode::MissingTimestampColumn
            | BatchErrorCode::WindowNotIncreasing => ErrorCategory::Config,
            // Mixed window bound kinds are reported as a type mismatch.
            BatchErrorCode::WindowKindMismatch
            | BatchErrorCode::RowShape
            | BatchErrorCode::RowsShape
            | BatchErrorCode::TimestampType
            | BatchErrorCode::IndexType => ErrorCategory::Shape,
            BatchErrorCode::SchemaMismatch
            | BatchErrorCode::MissingField
            | BatchErrorCode::PartitionMismatch
            | BatchErrorCode::TimestampInvalid
            | BatchErrorCode::OutOfWindow
            | BatchErrorCode::WindowMismatch
            | BatchErrorCode::PolicyMismatch => ErrorCategory::Content,
            BatchErrorCode::UnknownColumn | BatchErrorCode::PositionOutOfRange => {
                ErrorCategory::Lookup
            }
            BatchErrorCode::UnsupportedOperand => ErrorCategory::Unsupported,
        }
    }
}

impl fmt::Display for BatchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Expected-versus-actual details for a failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchDetails {
    /// Field or attribute that failed (e.g. "schema", "shard_id")
    pub field: String,
    /// Expected value or condition
    pub expected: String,
    /// Actual value found
    pub actual: String,
}

impl MismatchDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for MismatchDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Batch error with full context
#[derive(Debug, Clone, PartialEq)]
pub struct BatchError {
    code: BatchErrorCode,
    message: String,
    row: Option<usize>,
    details: Option<MismatchDetails>,
}

impl BatchError {
    /// Create an error with a code and message
    pub fn new(code: BatchErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            row: None,
            details: None,
        }
    }

    /// Attach the offending row index
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Attach expected/actual details
    pub fn with_details(mut self, details: MismatchDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn empty_schema(owner: &str) -> Self {
        Self::new(
            BatchErrorCode::EmptySchema,
            format!("{}: schema cannot be empty", owner),
        )
    }

    pub fn duplicate_column(owner: &str, column: &str) -> Self {
        Self::new(
            BatchErrorCode::DuplicateColumn,
            format!("{}: column '{}' appears more than once in schema", owner, column),
        )
    }

    pub fn missing_timestamp_column(column: &str) -> Self {
        Self::new(
            BatchErrorCode::MissingTimestampColumn,
            format!("WindowBatch: schema must include '{}' column", column),
        )
    }

    pub fn window_kind_mismatch(start_kind: &str, end_kind: &str) -> Self {
        Self::new(
            BatchErrorCode::WindowKindMismatch,
            "WindowBatch: window_start and window_end must be of the same kind",
        )
        .with_details(MismatchDetails::new("window_end", start_kind, end_kind))
    }

    pub fn window_not_increasing(start: i64, end: i64) -> Self {
        Self::new(
            BatchErrorCode::WindowNotIncreasing,
            format!(
                "WindowBatch: window_start must be strictly less than window_end ({} >= {})",
                start, end
            ),
        )
    }

    pub fn row_shape(owner: &str, actual_kind: &str) -> Self {
        Self::new(
            BatchErrorCode::RowShape,
            format!("{}: row must be a mapping, got {}", owner, actual_kind),
        )
    }

    pub fn rows_shape(owner: &str, actual_kind: &str) -> Self {
        Self::new(
            BatchErrorCode::RowsShape,
            format!("{}: rows must be a sequence of mappings, got {}", owner, actual_kind),
        )
    }

    pub fn timestamp_type(actual_kind: &str) -> Self {
        Self::new(
            BatchErrorCode::TimestampType,
            format!(
                "expected integer, float or datetime timestamp, got {}",
                actual_kind
            ),
        )
    }

    pub fn timestamp_invalid(reason: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::TimestampInvalid, reason)
    }

    pub fn index_type(owner: &str, actual_kind: &str) -> Self {
        Self::new(
            BatchErrorCode::IndexType,
            format!(
                "Invalid index type for {}: expected integer, range or column name, got {}",
                owner, actual_kind
            ),
        )
    }

    pub fn missing_field(owner: &str, field: &str) -> Self {
        Self::new(
            BatchErrorCode::MissingField,
            format!("{}: row is missing required '{}' column", owner, field),
        )
    }

    pub fn schema_mismatch(message: impl Into<String>, expected: String, actual: String) -> Self {
        Self::new(BatchErrorCode::SchemaMismatch, message)
            .with_details(MismatchDetails::new("schema", expected, actual))
    }

    pub fn partition_mismatch(
        message: impl Into<String>,
        key: &str,
        expected: String,
        actual: String,
    ) -> Self {
        Self::new(BatchErrorCode::PartitionMismatch, message)
            .with_details(MismatchDetails::new(key, expected, actual))
    }

    pub fn out_of_window(ts: i64, start: i64, end: i64) -> Self {
        Self::new(
            BatchErrorCode::OutOfWindow,
            format!(
                "WindowBatch: row timestamp {} outside window [{}, {})",
                ts, start, end
            ),
        )
    }

    pub fn window_mismatch(expected: (i64, i64), actual: (i64, i64)) -> Self {
        Self::new(
            BatchErrorCode::WindowMismatch,
            "Cannot add WindowBatch instances with different window ranges",
        )
        .with_details(MismatchDetails::new(
            "window_range",
            format!("[{}, {})", expected.0, expected.1),
            format!("[{}, {})", actual.0, actual.1),
        ))
    }

    pub fn policy_mismatch(expected: bool, actual: bool) -> Self {
        Self::new(
            BatchErrorCode::PolicyMismatch,
            "Cannot add WindowBatch instances with different validation policies",
        )
        .with_details(MismatchDetails::new(
            "strict_order",
            expected.to_string(),
            actual.to_string(),
        ))
    }

    pub fn unknown_column(owner: &str, column: &str, schema: &[String]) -> Self {
        Self::new(
            BatchErrorCode::UnknownColumn,
            format!(
                "Column '{}' does not exist in {} schema {}",
                column,
                owner,
                format_schema(schema)
            ),
        )
    }

    pub fn position_out_of_range(owner: &str, position: isize, len: usize) -> Self {
        Self::new(
            BatchErrorCode::PositionOutOfRange,
            format!(
                "{} index {} out of range for {} rows",
                owner, position, len
            ),
        )
    }

    pub fn unsupported_operand(owner: &str, operand: &str) -> Self {
        Self::new(
            BatchErrorCode::UnsupportedOperand,
            format!("unsupported operand for {} concatenation: {}", owner, operand),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> BatchErrorCode {
        self.code
    }

    /// Returns the failure category
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending row index, if any
    pub fn row(&self) -> Option<usize> {
        self.row
    }

    /// Returns mismatch details, if any
    pub fn details(&self) -> Option<&MismatchDetails> {
        self.details.as_ref()
    }

    /// Wrong kind of input
    pub fn is_shape(&self) -> bool {
        self.category() == ErrorCategory::Shape
    }

    /// Right kind of input, wrong content
    pub fn is_content(&self) -> bool {
        self.category() == ErrorCategory::Content
    }

    pub fn is_unsupported(&self) -> bool {
        self.category() == ErrorCategory::Unsupported
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.category(), self.code.code(), self.message)?;
        if let Some(row) = self.row {
            write!(f, " (row {})", row)?;
        }
        if let Some(ref details) = self.details {
            write!(f, " [{}]", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;

/// Renders a column list the way error messages and previews show it.
pub(crate) fn format_schema(schema: &[String]) -> String {
    format!("({})", schema.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_prefixed() {
        assert_eq!(BatchErrorCode::EmptySchema.code(), "BATCH_EMPTY_SCHEMA");
        assert_eq!(BatchErrorCode::OutOfWindow.code(), "BATCH_OUT_OF_WINDOW");
        assert_eq!(
            BatchErrorCode::UnsupportedOperand.code(),
            "BATCH_UNSUPPORTED_OPERAND"
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(BatchErrorCode::EmptySchema.category(), ErrorCategory::Config);
        assert_eq!(BatchErrorCode::RowShape.category(), ErrorCategory::Shape);
        assert_eq!(
            BatchErrorCode::WindowKindMismatch.category(),
            ErrorCategory::Shape
        );
        assert_eq!(
            BatchErrorCode::PartitionMismatch.category(),
            ErrorCategory::Content
        );
        assert_eq!(BatchErrorCode::UnknownColumn.category(), ErrorCategory::Lookup);
    }

    #[test]
    fn test_display_includes_row_and_details() {
        let err = BatchError::partition_mismatch("Shard ID mismatch", "shard_id", "3".into(), "4".into())
            .at_row(2);
        let display = format!("{}", err);
        assert!(display.contains("CONTENT"));
        assert!(display.contains("BATCH_PARTITION_MISMATCH"));
        assert!(display.contains("row 2"));
        assert!(display.contains("expected 3, got 4"));
    }

    #[test]
    fn test_unsupported_is_distinct_from_content() {
        let err = BatchError::unsupported_operand("ShardBatch", "string");
        assert!(err.is_unsupported());
        assert!(!err.is_content());
        assert!(!err.is_shape());
    }
}
