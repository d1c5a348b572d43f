//! Shard-partitioned batches
//!
//! Invariants:
//! - Every row has the partition key column (`shard_id` by default)
//! - Every row's key sequence equals the batch schema, order included
//! - Every row's partition value equals the batch shard id
//!
//! The schema and shard id are taken from the first row. An empty batch has
//! an empty schema and no shard id unless it was derived from a parent.

use std::fmt;
use std::ops::Add;

use super::container::RowContainer;
use super::operand::BatchOperand;
use super::preview::{self, DEFAULT_PREVIEW_ROWS};
use crate::config::BatchConfig;
use crate::errors::{format_schema, BatchError, BatchResult};
use crate::observability::{log_built, log_rejection, Event};
use crate::value::{FieldValue, Row, RowLike};

/// Default partition column
pub const SHARD_KEY: &str = "shard_id";

const KIND: &str = "ShardBatch";

/// Where a row check happens, for error messages.
#[derive(Debug, Clone, Copy)]
enum Stage {
    Init,
    Concat,
}

impl Stage {
    fn describe(&self) -> &'static str {
        match self {
            Stage::Init => "in ShardBatch initialisation",
            Stage::Concat => "when adding rows to ShardBatch",
        }
    }
}

/// Immutable batch of rows that all belong to one shard.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardBatch {
    rows: Vec<Row>,
    schema: Vec<String>,
    shard_id: Option<FieldValue>,
    shard_key: String,
}

impl ShardBatch {
    /// Builds a batch partitioned on `shard_id`.
    ///
    /// Rows are copied; the caller's rows are never referenced afterward.
    ///
    /// # Errors
    ///
    /// The first failing row aborts construction:
    /// - BATCH_MISSING_FIELD if a row lacks `shard_id`
    /// - BATCH_SCHEMA_MISMATCH if a row's keys differ from the first row's
    /// - BATCH_PARTITION_MISMATCH if a row's shard id differs from the first row's
    pub fn new<R: RowLike>(rows: &[R]) -> BatchResult<Self> {
        Self::with_key(rows, SHARD_KEY)
    }

    /// Builds a batch partitioned on the configured shard key.
    pub fn with_config<R: RowLike>(rows: &[R], config: &BatchConfig) -> BatchResult<Self> {
        Self::with_key(rows, &config.shard_key)
    }

    /// Builds a batch partitioned on `shard_key`.
    pub fn with_key<R: RowLike>(rows: &[R], shard_key: &str) -> BatchResult<Self> {
        let template = Self::template(rows.first(), shard_key);
        finish_build(template.admit(rows, Stage::Init))
    }

    /// Builds a batch from a dynamically typed list of maps.
    ///
    /// Each element is shape-checked and then fully checked before the next
    /// one is looked at.
    ///
    /// # Errors
    ///
    /// BATCH_ROWS_SHAPE if `rows` is not a list, then per element in order
    /// BATCH_ROW_SHAPE if it is not a map or any error [`new`](Self::new)
    /// reports.
    pub fn from_value(rows: &FieldValue) -> BatchResult<Self> {
        let result = list_items(rows).and_then(|items| {
            let first = match items.first() {
                Some(item) => Some(as_row(item).map_err(|e| e.at_row(0))?),
                None => None,
            };
            let template = Self::template(first, SHARD_KEY);
            let admitted = template.admit_values(items, Stage::Init)?;
            Ok(template.from_checked(admitted))
        });
        finish_build(result)
    }

    /// Shard identifier; `None` only for an empty batch built from no rows.
    pub fn shard_id(&self) -> Option<&FieldValue> {
        self.shard_id.as_ref()
    }

    /// Partition column name
    pub fn shard_key(&self) -> &str {
        &self.shard_key
    }

    /// Concatenates with a same-shard batch, a row sequence or a dynamic
    /// list of maps.
    ///
    /// # Errors
    ///
    /// - BATCH_PARTITION_MISMATCH / BATCH_SCHEMA_MISMATCH on metadata mismatch
    /// - BATCH_ROW_SHAPE for a non-map element in a dynamic list
    /// - BATCH_UNSUPPORTED_OPERAND for any other operand
    pub fn combine<'a>(&self, other: impl Into<BatchOperand<'a>>) -> BatchResult<Self> {
        let result = match other.into() {
            BatchOperand::Shard(other) => self.concat(other),
            BatchOperand::Rows(rows) => self.concat_rows(rows),
            BatchOperand::Value(value) => match value.as_list() {
                Some(items) => self.concat_values(items),
                None => Err(BatchError::unsupported_operand(KIND, value.type_name())),
            },
            operand @ BatchOperand::Window(_) => {
                Err(BatchError::unsupported_operand(KIND, &operand.describe()))
            }
        };
        if let Err(ref e) = result {
            log_rejection(KIND, e);
        }
        result
    }

    /// Concatenates two batches of the same shard and schema.
    pub fn concat(&self, other: &ShardBatch) -> BatchResult<Self> {
        if self.shard_key != other.shard_key {
            return Err(BatchError::partition_mismatch(
                "Cannot add ShardBatch instances partitioned on different keys",
                "shard_key",
                self.shard_key.clone(),
                other.shard_key.clone(),
            ));
        }
        if !same_shard(self.shard_id.as_ref(), other.shard_id.as_ref()) {
            return Err(BatchError::partition_mismatch(
                "Cannot add ShardBatch instances with different shard IDs",
                &self.shard_key,
                describe_shard(self.shard_id.as_ref()),
                describe_shard(other.shard_id.as_ref()),
            ));
        }
        if self.schema != other.schema {
            return Err(BatchError::schema_mismatch(
                "Cannot add ShardBatch instances with different schemas",
                format_schema(&self.schema),
                format_schema(&other.schema),
            ));
        }

        let mut rows = Vec::with_capacity(self.len() + other.len());
        rows.extend_from_slice(&self.rows);
        rows.extend_from_slice(&other.rows);
        let batch = self.from_checked(rows);
        log_built(Event::BatchCombined, KIND, batch.len());
        Ok(batch)
    }

    /// Appends rows that match this batch's schema and shard id.
    pub fn concat_rows<R: RowLike>(&self, rows: &[R]) -> BatchResult<Self> {
        let appended = self.admit(rows, Stage::Concat)?;

        let mut combined = Vec::with_capacity(self.len() + appended.len());
        combined.extend_from_slice(&self.rows);
        combined.extend(appended.rows);
        let batch = self.from_checked(combined);
        log_built(Event::BatchCombined, KIND, batch.len());
        Ok(batch)
    }

    /// Appends the maps of a dynamic list, checking each element's shape and
    /// content before moving to the next.
    fn concat_values(&self, items: &[FieldValue]) -> BatchResult<Self> {
        let appended = self.admit_values(items, Stage::Concat)?;

        let mut combined = Vec::with_capacity(self.len() + appended.len());
        combined.extend_from_slice(&self.rows);
        combined.extend(appended);
        let batch = self.from_checked(combined);
        log_built(Event::BatchCombined, KIND, batch.len());
        Ok(batch)
    }

    /// Preview with at most `max_rows` rows.
    pub fn render(&self, max_rows: usize) -> String {
        preview::render(&self.header(), &self.rows, max_rows)
    }

    fn header(&self) -> String {
        format!(
            "ShardBatch({}={}, rows={}, cols=[{}])",
            self.shard_key,
            describe_shard(self.shard_id.as_ref()),
            self.len(),
            self.schema.join(", ")
        )
    }

    /// Empty batch with metadata derived from `first`.
    fn template<R: RowLike + ?Sized>(first: Option<&R>, shard_key: &str) -> Self {
        let (schema, shard_id) = match first {
            Some(first) => (
                first.column_names().iter().map(|k| k.to_string()).collect(),
                first.field_value(shard_key),
            ),
            None => (Vec::new(), None),
        };

        Self {
            rows: Vec::new(),
            schema,
            shard_id,
            shard_key: shard_key.to_string(),
        }
    }

    /// Checks dynamic list elements in order and copies their maps.
    fn admit_values(&self, items: &[FieldValue], stage: Stage) -> BatchResult<Vec<Row>> {
        let mut admitted = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let row = as_row(item)
                .and_then(|row| self.check_row(row, stage).map(|()| row))
                .map_err(|e| e.at_row(idx))?;
            admitted.push(row.clone());
        }
        Ok(admitted)
    }

    /// Checks `rows` against this batch's metadata and returns a batch that
    /// holds copies of them, metadata unchanged.
    fn admit<R: RowLike>(&self, rows: &[R], stage: Stage) -> BatchResult<Self> {
        let mut admitted = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            self.check_row(row, stage).map_err(|e| e.at_row(idx))?;
            admitted.push(row.to_row());
        }

        Ok(self.from_checked(admitted))
    }

    /// Wraps rows already known to satisfy this batch's metadata.
    fn from_checked(&self, rows: Vec<Row>) -> Self {
        Self {
            rows,
            schema: self.schema.clone(),
            shard_id: self.shard_id.clone(),
            shard_key: self.shard_key.clone(),
        }
    }

    fn check_row<R: RowLike + ?Sized>(&self, row: &R, stage: Stage) -> BatchResult<()> {
        let keys = row.column_names();

        if !row.has_field(&self.shard_key) {
            return Err(BatchError::missing_field(KIND, &self.shard_key));
        }

        if keys.len() != self.schema.len()
            || keys.iter().zip(&self.schema).any(|(k, s)| *k != s.as_str())
        {
            let actual: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
            return Err(BatchError::schema_mismatch(
                format!("Schema mismatch {}", stage.describe()),
                format_schema(&self.schema),
                format_schema(&actual),
            ));
        }

        let shard_id = row.field_value(&self.shard_key);
        if !same_shard(shard_id.as_ref(), self.shard_id.as_ref()) {
            return Err(BatchError::partition_mismatch(
                format!("Shard ID mismatch {}", stage.describe()),
                &self.shard_key,
                describe_shard(self.shard_id.as_ref()),
                describe_shard(shard_id.as_ref()),
            ));
        }

        Ok(())
    }
}

impl RowContainer for ShardBatch {
    const KIND: &'static str = KIND;

    fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Keeps the parent's schema and shard id even when `rows` is empty.
    /// `rows` come from this batch, so they already satisfy its metadata.
    fn with_rows(&self, rows: Vec<Row>) -> BatchResult<Self> {
        let batch = self.from_checked(rows);
        log_built(Event::BatchSliced, KIND, batch.len());
        Ok(batch)
    }
}

impl fmt::Display for ShardBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        preview::write_preview(f, &self.header(), &self.rows, DEFAULT_PREVIEW_ROWS)
    }
}

impl<'a> IntoIterator for &'a ShardBatch {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl Add<&ShardBatch> for &ShardBatch {
    type Output = BatchResult<ShardBatch>;

    fn add(self, other: &ShardBatch) -> Self::Output {
        self.combine(other)
    }
}

impl Add<&[Row]> for &ShardBatch {
    type Output = BatchResult<ShardBatch>;

    fn add(self, rows: &[Row]) -> Self::Output {
        self.combine(rows)
    }
}

fn describe_shard(shard_id: Option<&FieldValue>) -> String {
    shard_id.map_or_else(|| "None".to_string(), |v| v.to_string())
}

/// Shard ids match by value; integer and float ids compare numerically.
fn same_shard(a: Option<&FieldValue>, b: Option<&FieldValue>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.value_eq(b),
        (None, None) => true,
        _ => false,
    }
}

fn list_items(rows: &FieldValue) -> BatchResult<&[FieldValue]> {
    rows.as_list()
        .ok_or_else(|| BatchError::rows_shape(KIND, rows.type_name()))
}

fn as_row(item: &FieldValue) -> BatchResult<&Row> {
    item.as_map()
        .ok_or_else(|| BatchError::row_shape(KIND, item.type_name()))
}

fn finish_build(result: BatchResult<ShardBatch>) -> BatchResult<ShardBatch> {
    match result {
        Ok(ref batch) => log_built(Event::BatchBuilt, KIND, batch.len()),
        Err(ref e) => log_rejection(KIND, e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BatchErrorCode;
    use serde_json::json;

    fn row(shard: i64, user: &str) -> Row {
        Row::from_json(&json!({"shard_id": shard, "user_id": user})).unwrap()
    }

    #[test]
    fn test_derives_schema_and_shard_from_first_row() {
        let batch = ShardBatch::new(&[row(3, "u1"), row(3, "u2")]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.schema(), ["shard_id", "user_id"]);
        assert_eq!(batch.shard_id(), Some(&FieldValue::Integer(3)));
    }

    #[test]
    fn test_empty_is_degenerate() {
        let batch = ShardBatch::new::<Row>(&[]).unwrap();
        assert!(batch.is_empty());
        assert!(batch.schema().is_empty());
        assert_eq!(batch.shard_id(), None);
    }

    #[test]
    fn test_missing_shard_key_names_row() {
        let rows = vec![Row::from_json(&json!({"user_id": "u1"})).unwrap()];
        let err = ShardBatch::new(&rows).unwrap_err();
        assert_eq!(err.code(), BatchErrorCode::MissingField);
        assert_eq!(err.row(), Some(0));
    }

    #[test]
    fn test_zero_and_empty_string_are_valid_shard_ids() {
        let batch = ShardBatch::new(&[row(0, "u1"), row(0, "u2")]).unwrap();
        assert_eq!(batch.shard_id(), Some(&FieldValue::Integer(0)));

        let rows = vec![
            Row::from_json(&json!({"shard_id": ""})).unwrap(),
            Row::from_json(&json!({"shard_id": ""})).unwrap(),
        ];
        assert!(ShardBatch::new(&rows).is_ok());
    }

    #[test]
    fn test_custom_shard_key() {
        let rows = vec![
            Row::from_json(&json!({"bucket": "a", "v": 1})).unwrap(),
            Row::from_json(&json!({"bucket": "a", "v": 2})).unwrap(),
        ];
        let batch = ShardBatch::with_key(&rows, "bucket").unwrap();
        assert_eq!(batch.shard_key(), "bucket");
        assert_eq!(batch.shard_id(), Some(&FieldValue::from("a")));
        assert!(ShardBatch::new(&rows).is_err());
    }

    #[test]
    fn test_slice_clamps_and_keeps_metadata() {
        let batch = ShardBatch::new(&[row(3, "u1"), row(3, "u2"), row(3, "u3")]).unwrap();

        let tail = batch.slice(1, 10).unwrap();
        assert_eq!(tail.len(), 2);

        let empty = batch.slice(5, 9).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.shard_id(), Some(&FieldValue::Integer(3)));
        assert_eq!(empty.schema(), batch.schema());
    }

    #[test]
    fn test_full_slice_equals_parent() {
        let rows = vec![
            Row::from_json(&json!({"shard_id": 3, "user_id": "u1"})).unwrap(),
            Row::from_json(&json!({"shard_id": 3.0, "user_id": "u2"})).unwrap(),
        ];
        let batch = ShardBatch::new(&rows).unwrap();

        assert_eq!(batch.slice(0, batch.len()).unwrap(), batch);
        let tail = batch.slice(1, 2).unwrap();
        assert_eq!(tail.row(0).unwrap().get("shard_id"), Some(&FieldValue::Float(3.0)));
        assert_eq!(tail.shard_id(), Some(&FieldValue::Integer(3)));
    }

    #[test]
    fn test_combine_scalar_is_unsupported() {
        let batch = ShardBatch::new(&[row(3, "u1")]).unwrap();
        let err = batch.combine(&FieldValue::from("nope")).unwrap_err();
        assert_eq!(err.code(), BatchErrorCode::UnsupportedOperand);
    }

    #[test]
    fn test_display_header() {
        let batch = ShardBatch::new(&[row(3, "u1")]).unwrap();
        let text = batch.to_string();
        assert!(text.starts_with("ShardBatch(shard_id=3, rows=1, cols=[shard_id, user_id])["));

        let empty = ShardBatch::new::<Row>(&[]).unwrap();
        assert_eq!(empty.to_string(), "ShardBatch(shard_id=None, rows=0, cols=[])[]");
    }
}
