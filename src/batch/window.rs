//! Event-time windowed batches
//!
//! A `WindowBatch` holds rows whose timestamps fall in the half-open window
//! `[window_start, window_end)`.
//!
//! Invariants:
//! - Schema includes the timestamp column
//! - Bounds are supplied as the same kind of value and stored as epoch seconds
//! - `window_start < window_end`
//! - Every row's timestamp is normalized to epoch seconds and inside the window
//! - Every row passes the batch's `SchemaValidator`
//!
//! This is a container only; it never assigns rows to windows.

use std::fmt;
use std::ops::Add;

use super::container::RowContainer;
use super::operand::BatchOperand;
use super::preview::{self, DEFAULT_PREVIEW_ROWS};
use crate::config::BatchConfig;
use crate::errors::{format_schema, BatchError, BatchResult, MismatchDetails};
use crate::observability::{log_built, log_rejection, Event};
use crate::schema::{SchemaValidator, ValidationPolicy};
use crate::time::normalize_to_unix_ts;
use crate::value::{FieldValue, Row, RowLike};

/// Default event-time column
pub const TIMESTAMP_COLUMN: &str = "timestamp";

const KIND: &str = "WindowBatch";

/// Immutable batch of rows inside one half-open event-time window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBatch {
    rows: Vec<Row>,
    validator: SchemaValidator,
    window_start: i64,
    window_end: i64,
    timestamp_column: String,
}

impl WindowBatch {
    /// Builds a window batch.
    ///
    /// `window_start` and `window_end` must both be epoch numbers or both be
    /// calendar values.
    ///
    /// # Errors
    ///
    /// - BATCH_EMPTY_SCHEMA / BATCH_MISSING_TIMESTAMP_COLUMN for a bad schema
    /// - BATCH_WINDOW_KIND_MISMATCH if the bounds are different kinds
    /// - BATCH_WINDOW_NOT_INCREASING unless `window_start < window_end`
    /// - per row, in order: BATCH_MISSING_FIELD, timestamp normalization
    ///   errors, BATCH_OUT_OF_WINDOW, then schema validation errors
    pub fn new<R, I, S>(
        rows: &[R],
        window_start: impl Into<FieldValue>,
        window_end: impl Into<FieldValue>,
        schema: I,
        policy: impl Into<ValidationPolicy>,
    ) -> BatchResult<Self>
    where
        R: RowLike,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        WindowBatchBuilder::new(window_start, window_end)
            .schema(schema)
            .policy(policy)
            .build(rows)
    }

    /// Starts a builder for the window `[window_start, window_end)`.
    pub fn builder(
        window_start: impl Into<FieldValue>,
        window_end: impl Into<FieldValue>,
    ) -> WindowBatchBuilder {
        WindowBatchBuilder::new(window_start, window_end)
    }

    /// `(window_start, window_end)` in epoch seconds
    pub fn window_range(&self) -> (i64, i64) {
        (self.window_start, self.window_end)
    }

    /// Inclusive start in epoch seconds
    pub fn window_start(&self) -> i64 {
        self.window_start
    }

    /// Exclusive end in epoch seconds
    pub fn window_end(&self) -> i64 {
        self.window_end
    }

    /// True if `ts` falls inside `[window_start, window_end)`.
    pub fn contains_timestamp(&self, ts: i64) -> bool {
        self.window_start <= ts && ts < self.window_end
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.validator.policy()
    }

    pub fn strict_order(&self) -> bool {
        self.validator.strict_order()
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    /// Concatenates with another window batch over the same window, schema
    /// and policy.
    ///
    /// # Errors
    ///
    /// - BATCH_SCHEMA_MISMATCH, BATCH_WINDOW_MISMATCH, BATCH_POLICY_MISMATCH
    /// - BATCH_UNSUPPORTED_OPERAND for any operand that is not a WindowBatch
    pub fn combine<'a>(&self, other: impl Into<BatchOperand<'a>>) -> BatchResult<Self> {
        let result = match other.into() {
            BatchOperand::Window(other) => self.concat(other),
            operand => Err(BatchError::unsupported_operand(KIND, &operand.describe())),
        };
        if let Err(ref e) = result {
            log_rejection(KIND, e);
        }
        result
    }

    /// Concatenates two compatible window batches.
    pub fn concat(&self, other: &WindowBatch) -> BatchResult<Self> {
        if self.schema() != other.schema() || self.timestamp_column != other.timestamp_column {
            return Err(BatchError::schema_mismatch(
                "Cannot add WindowBatch instances with different schemas",
                format_schema(self.schema()),
                format_schema(other.schema()),
            ));
        }
        if self.window_range() != other.window_range() {
            return Err(BatchError::window_mismatch(
                self.window_range(),
                other.window_range(),
            ));
        }
        if self.strict_order() != other.strict_order() {
            return Err(BatchError::policy_mismatch(
                self.strict_order(),
                other.strict_order(),
            ));
        }

        let mut rows = Vec::with_capacity(self.len() + other.len());
        rows.extend_from_slice(&self.rows);
        rows.extend_from_slice(&other.rows);
        let batch = self.revalidated(rows)?;
        log_built(Event::BatchCombined, KIND, batch.len());
        Ok(batch)
    }

    /// Preview with at most `max_rows` rows.
    pub fn render(&self, max_rows: usize) -> String {
        preview::render(&self.header(), &self.rows, max_rows)
    }

    fn header(&self) -> String {
        format!(
            "WindowBatch(start={}, end={}, rows={}, cols=[{}])",
            self.window_start,
            self.window_end,
            self.len(),
            self.schema().join(", ")
        )
    }

    /// Normalizes and checks one caller-supplied row, returning the copy
    /// that gets stored.
    fn admit_row<R: RowLike + ?Sized>(&self, row: &R) -> BatchResult<Row> {
        let raw = row
            .field_value(&self.timestamp_column)
            .ok_or_else(|| BatchError::missing_field(KIND, &self.timestamp_column))?;

        let ts = normalize_to_unix_ts(&raw)?;
        if !self.contains_timestamp(ts) {
            return Err(BatchError::out_of_window(ts, self.window_start, self.window_end));
        }

        let mut copy = row.to_row();
        copy.insert(self.timestamp_column.clone(), ts);
        self.validator.validate_row(&copy)?;
        Ok(copy)
    }

    /// Re-checks a stored row, whose timestamp is already epoch seconds.
    fn recheck_row(&self, row: &Row) -> BatchResult<()> {
        match row.get(&self.timestamp_column) {
            Some(FieldValue::Integer(ts)) if self.contains_timestamp(*ts) => {}
            Some(FieldValue::Integer(ts)) => {
                return Err(BatchError::out_of_window(*ts, self.window_start, self.window_end));
            }
            Some(other) => return Err(BatchError::timestamp_type(other.type_name())),
            None => return Err(BatchError::missing_field(KIND, &self.timestamp_column)),
        }
        self.validator.validate_row(row)
    }

    /// New batch with this window, schema and policy over stored rows.
    fn revalidated(&self, rows: Vec<Row>) -> BatchResult<Self> {
        for (idx, row) in rows.iter().enumerate() {
            self.recheck_row(row).map_err(|e| e.at_row(idx))?;
        }
        Ok(Self {
            rows,
            validator: self.validator.clone(),
            window_start: self.window_start,
            window_end: self.window_end,
            timestamp_column: self.timestamp_column.clone(),
        })
    }
}

impl RowContainer for WindowBatch {
    const KIND: &'static str = KIND;

    fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn schema(&self) -> &[String] {
        self.validator.schema()
    }

    fn with_rows(&self, rows: Vec<Row>) -> BatchResult<Self> {
        let batch = self.revalidated(rows)?;
        log_built(Event::BatchSliced, KIND, batch.len());
        Ok(batch)
    }
}

impl fmt::Display for WindowBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        preview::write_preview(f, &self.header(), &self.rows, DEFAULT_PREVIEW_ROWS)
    }
}

impl<'a> IntoIterator for &'a WindowBatch {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl Add<&WindowBatch> for &WindowBatch {
    type Output = BatchResult<WindowBatch>;

    fn add(self, other: &WindowBatch) -> Self::Output {
        self.combine(other)
    }
}

/// Builder for [`WindowBatch`].
#[derive(Debug, Clone)]
pub struct WindowBatchBuilder {
    window_start: FieldValue,
    window_end: FieldValue,
    schema: Vec<String>,
    policy: ValidationPolicy,
    timestamp_column: String,
}

impl WindowBatchBuilder {
    pub fn new(window_start: impl Into<FieldValue>, window_end: impl Into<FieldValue>) -> Self {
        Self {
            window_start: window_start.into(),
            window_end: window_end.into(),
            schema: Vec::new(),
            policy: ValidationPolicy::default(),
            timestamp_column: TIMESTAMP_COLUMN.to_string(),
        }
    }

    pub fn schema<I, S>(mut self, schema: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema = schema.into_iter().map(Into::into).collect();
        self
    }

    pub fn policy(mut self, policy: impl Into<ValidationPolicy>) -> Self {
        self.policy = policy.into();
        self
    }

    pub fn strict_order(self, strict_order: bool) -> Self {
        self.policy(strict_order)
    }

    pub fn timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = column.into();
        self
    }

    /// Applies the configured timestamp column and policy.
    pub fn config(self, config: &BatchConfig) -> Self {
        self.timestamp_column(config.timestamp_column.clone())
            .policy(config.policy())
    }

    /// Validates everything and builds the batch.
    pub fn build<R: RowLike>(&self, rows: &[R]) -> BatchResult<WindowBatch> {
        let result = self.empty_batch().and_then(|mut batch| {
            let admitted = rows
                .iter()
                .enumerate()
                .map(|(idx, row)| batch.admit_row(row).map_err(|e| e.at_row(idx)))
                .collect::<BatchResult<Vec<_>>>()?;
            batch.rows = admitted;
            Ok(batch)
        });
        finish_build(result)
    }

    /// Builds from a dynamically typed list of maps.
    ///
    /// Each element is shape-checked and then fully validated before the
    /// next one is looked at.
    ///
    /// # Errors
    ///
    /// Window and schema errors as [`build`](Self::build), then
    /// BATCH_ROWS_SHAPE if `rows` is not a list, then per element in order
    /// BATCH_ROW_SHAPE if it is not a map or any row error.
    pub fn build_from_value(&self, rows: &FieldValue) -> BatchResult<WindowBatch> {
        let result = self.empty_batch().and_then(|mut batch| {
            let items = rows
                .as_list()
                .ok_or_else(|| BatchError::rows_shape(KIND, rows.type_name()))?;

            let admitted = items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    item.as_map()
                        .ok_or_else(|| BatchError::row_shape(KIND, item.type_name()))
                        .and_then(|row| batch.admit_row(row))
                        .map_err(|e| e.at_row(idx))
                })
                .collect::<BatchResult<Vec<_>>>()?;
            batch.rows = admitted;
            Ok(batch)
        });
        finish_build(result)
    }

    /// Checks schema and window bounds; the returned batch has no rows.
    fn empty_batch(&self) -> BatchResult<WindowBatch> {
        // 1. Schema and validator
        let validator = SchemaValidator::new(self.schema.iter().cloned(), self.policy)?;
        if !validator.has_column(&self.timestamp_column) {
            return Err(BatchError::missing_timestamp_column(&self.timestamp_column));
        }

        // 2. Window bounds, kind-checked before normalization
        let start_kind = self.window_start.kind();
        let end_kind = self.window_end.kind();
        if start_kind != end_kind {
            return Err(BatchError::window_kind_mismatch(
                start_kind.as_str(),
                end_kind.as_str(),
            ));
        }
        let window_start = normalize_to_unix_ts(&self.window_start).map_err(|e| {
            e.with_details(MismatchDetails::new(
                "window_start",
                "timestamp",
                self.window_start.to_string(),
            ))
        })?;
        let window_end = normalize_to_unix_ts(&self.window_end).map_err(|e| {
            e.with_details(MismatchDetails::new(
                "window_end",
                "timestamp",
                self.window_end.to_string(),
            ))
        })?;
        if window_start >= window_end {
            return Err(BatchError::window_not_increasing(window_start, window_end));
        }

        Ok(WindowBatch {
            rows: Vec::new(),
            validator,
            window_start,
            window_end,
            timestamp_column: self.timestamp_column.clone(),
        })
    }
}

fn finish_build(result: BatchResult<WindowBatch>) -> BatchResult<WindowBatch> {
    match result {
        Ok(ref batch) => log_built(Event::BatchBuilt, KIND, batch.len()),
        Err(ref e) => log_rejection(KIND, e),
    }
    result
}
