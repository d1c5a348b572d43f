//! WindowBatch Invariant Tests
//!
//! - Window bounds are the same kind and strictly increasing
//! - The window is half-open: start included, end excluded
//! - Stored timestamps are normalized epoch seconds
//! - Slices and concatenations reuse bounds, schema and policy
//! - Concatenation accepts only window batches

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use rowbatch::batch::{BatchIndex, RowContainer, ShardBatch, WindowBatch};
use rowbatch::config::BatchConfig;
use rowbatch::errors::{BatchErrorCode, ErrorCategory};
use rowbatch::time::normalize_to_unix_ts;
use rowbatch::value::{FieldValue, Row};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

const SCHEMA: [&str; 3] = ["timestamp", "user_id", "value"];
const START: i64 = 1_700_000_000;
const END: i64 = 1_700_001_000;

fn event(ts: impl Into<FieldValue>, user: &str, value: i64) -> Row {
    let mut row = Row::new();
    row.insert("timestamp", ts);
    row.insert("user_id", user);
    row.insert("value", value);
    row
}

fn scenario_rows() -> Vec<Row> {
    vec![
        event(1_700_000_010i64, "u1", 10),
        event(1_700_000_200i64, "u2", 20),
        event(1_700_000_300i64, "u3", 30),
    ]
}

fn scenario_batch() -> WindowBatch {
    WindowBatch::new(&scenario_rows(), START, END, SCHEMA, true).unwrap()
}

/// 2023-11-14T22:13:20, which is epoch 1700000000 read as UTC
fn naive_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 11, 14)
        .unwrap()
        .and_hms_opt(22, 13, 20)
        .unwrap()
}

// =============================================================================
// Scenario Tests
// =============================================================================

/// Three in-window rows build a batch over the requested window.
#[test]
fn test_window_scenario() {
    let batch = scenario_batch();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.window_range(), (START, END));
    assert_eq!(batch.rows().len(), 3);
}

/// A row stamped with the window end is rejected.
#[test]
fn test_window_end_is_excluded() {
    let mut rows = scenario_rows();
    rows[1] = event(END, "u2", 20);

    let err = WindowBatch::new(&rows, START, END, SCHEMA, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::OutOfWindow);
    assert_eq!(err.category(), ErrorCategory::Content);
    assert_eq!(err.row(), Some(1));
}

/// A row stamped with the window start is included.
#[test]
fn test_window_start_is_included() {
    let rows = vec![event(START, "u1", 1), event(END - 1, "u2", 2)];
    let batch = WindowBatch::new(&rows, START, END, SCHEMA, true).unwrap();
    assert_eq!(batch.len(), 2);
    assert!(batch.contains_timestamp(START));
    assert!(!batch.contains_timestamp(END));
}

/// Rows before the window are rejected too.
#[test]
fn test_before_window_is_rejected() {
    let rows = vec![event(START - 1, "u1", 1)];
    let err = WindowBatch::new(&rows, START, END, SCHEMA, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::OutOfWindow);
}

// =============================================================================
// Window Bound Tests
// =============================================================================

/// Equal bounds always fail.
#[test]
fn test_equal_bounds_fail() {
    let err = WindowBatch::new(&scenario_rows(), START, START, SCHEMA, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::WindowNotIncreasing);
    assert_eq!(err.category(), ErrorCategory::Config);

    let err = WindowBatch::new::<Row, _, _>(&[], END, START, SCHEMA, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::WindowNotIncreasing);
}

/// Mixed bound kinds fail even when they name the same instant.
#[test]
fn test_mixed_bound_kinds_fail() {
    let rows: Vec<Row> = Vec::new();

    let err = WindowBatch::new(&rows, START, naive_start() + chrono::Duration::seconds(1000), SCHEMA, true)
        .unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::WindowKindMismatch);
    assert!(err.is_shape());

    let err = WindowBatch::new(&rows, naive_start(), END, SCHEMA, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::WindowKindMismatch);
}

/// Integer and float bounds are both numeric epochs.
#[test]
fn test_numeric_bounds_of_either_type() {
    let batch = WindowBatch::new(&scenario_rows(), START as f64 + 0.9, END, SCHEMA, true).unwrap();
    assert_eq!(batch.window_range(), (START, END));
}

/// Naive and offset-aware calendar bounds mix freely.
#[test]
fn test_calendar_bounds() {
    let end = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2023, 11, 14, 23, 30, 0)
        .unwrap();

    let batch = WindowBatch::new(&scenario_rows(), naive_start(), end, SCHEMA, true).unwrap();
    assert_eq!(batch.window_range(), (START, START + 1000));
}

/// Zero as a bound is an invalid timestamp.
#[test]
fn test_zero_bound_is_invalid() {
    let err = WindowBatch::new::<Row, _, _>(&[], 0i64, 10i64, SCHEMA, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::TimestampInvalid);
    assert_eq!(err.details().unwrap().field, "window_start");
}

/// The schema must name the timestamp column.
#[test]
fn test_schema_without_timestamp_fails() {
    let err = WindowBatch::new::<Row, _, _>(&[], START, END, ["user_id", "value"], true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::MissingTimestampColumn);

    let empty: [&str; 0] = [];
    let err = WindowBatch::new::<Row, _, _>(&[], START, END, empty, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::EmptySchema);
}

// =============================================================================
// Normalization Tests
// =============================================================================

/// Naive calendar timestamps are read as UTC.
#[test]
fn test_naive_timestamps_are_utc() {
    let ts = naive_start() + chrono::Duration::seconds(10);
    let rows = vec![event(ts, "u1", 1)];

    let batch = WindowBatch::new(&rows, START, END, SCHEMA, true).unwrap();
    assert_eq!(
        batch.row(0).unwrap().get("timestamp"),
        Some(&FieldValue::Integer(START + 10))
    );
    assert_eq!(
        normalize_to_unix_ts(&FieldValue::from(ts)).unwrap(),
        normalize_to_unix_ts(&FieldValue::from(ts.and_utc())).unwrap()
    );
}

/// Integer epochs normalize to themselves.
#[test]
fn test_integer_epoch_round_trip() {
    for ts in [1i64, START, END, -5] {
        assert_eq!(normalize_to_unix_ts(&FieldValue::Integer(ts)).unwrap(), ts);
    }
}

/// Timestamp errors carry the offending row.
#[test]
fn test_row_timestamp_errors() {
    let rows = vec![event(START + 1, "u1", 1), event("yesterday", "u2", 2)];
    let err = WindowBatch::new(&rows, START, END, SCHEMA, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::TimestampType);
    assert_eq!(err.row(), Some(1));

    let rows = vec![event(FieldValue::Null, "u1", 1)];
    let err = WindowBatch::new(&rows, START, END, SCHEMA, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::TimestampInvalid);
}

/// Schema errors come after the window check and are unchanged.
#[test]
fn test_schema_validation_after_window_check() {
    let rows = vec![Row::from_json(&json!({"user_id": "u1", "timestamp": START + 1, "value": 1})).unwrap()];

    let err = WindowBatch::new(&rows, START, END, SCHEMA, true).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::SchemaMismatch);

    let batch = WindowBatch::new(&rows, START, END, SCHEMA, false).unwrap();
    assert!(!batch.strict_order());
}

/// The caller's rows keep their original timestamps.
#[test]
fn test_input_rows_are_not_modified() {
    let rows = vec![event(START as f64 + 5.5, "u1", 1)];
    let batch = WindowBatch::new(&rows, START, END, SCHEMA, true).unwrap();

    assert_eq!(rows[0].get("timestamp"), Some(&FieldValue::Float(START as f64 + 5.5)));
    assert_eq!(
        batch.row(0).unwrap().get("timestamp"),
        Some(&FieldValue::Integer(START + 5))
    );
}

/// Dynamic input must be a list of maps.
#[test]
fn test_build_from_value() {
    let builder = WindowBatch::builder(START, END).schema(SCHEMA);

    let rows = FieldValue::from(json!([{"timestamp": START + 1, "user_id": "u1", "value": 1}]));
    assert_eq!(builder.build_from_value(&rows).unwrap().len(), 1);

    let err = builder.build_from_value(&FieldValue::from("rows")).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::RowsShape);

    let err = builder.build_from_value(&FieldValue::from(json!([[1, 2]]))).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::RowShape);
    assert_eq!(err.row(), Some(0));
}

/// A content failure in an earlier element wins over a later shape failure.
#[test]
fn test_build_from_value_checks_elements_in_order() {
    let builder = WindowBatch::builder(START, END).schema(SCHEMA);
    let rows = FieldValue::from(json!([
        {"timestamp": 5, "user_id": "u1", "value": 1},
        [1, 2]
    ]));

    let err = builder.build_from_value(&rows).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::OutOfWindow);
    assert_eq!(err.row(), Some(0));

    let rows = FieldValue::from(json!([
        {"timestamp": START + 1, "user_id": "u1", "value": 1},
        [1, 2]
    ]));
    let err = builder.build_from_value(&rows).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::RowShape);
    assert_eq!(err.row(), Some(1));
}

/// Configuration supplies the timestamp column and policy.
#[test]
fn test_builder_from_config() {
    let config =
        BatchConfig::from_json_str(r#"{"timestamp_column": "ts", "strict_order": false}"#).unwrap();
    let rows = vec![Row::from_json(&json!({"v": 1, "ts": START + 1})).unwrap()];

    let batch = WindowBatch::builder(START, END)
        .schema(["ts", "v"])
        .config(&config)
        .build(&rows)
        .unwrap();
    assert_eq!(batch.timestamp_column(), "ts");
    assert!(!batch.strict_order());
    assert!(!batch.render(config.preview_rows).contains("more rows"));
}

// =============================================================================
// Indexing Tests
// =============================================================================

/// Slices reuse the parent's bounds, schema and policy.
#[test]
fn test_slice_reuses_window() {
    let batch = scenario_batch();

    let tail = batch.get(BatchIndex::Range(1, 10)).unwrap().into_slice().unwrap();
    assert_eq!(tail.len(), 2);
    assert_eq!(tail.window_range(), batch.window_range());
    assert_eq!(tail.schema(), batch.schema());
    assert_eq!(tail.strict_order(), batch.strict_order());

    let empty = batch.slice(2, 1).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.window_range(), batch.window_range());
}

/// Column access, membership and positional access.
#[test]
fn test_read_operations() {
    let batch = scenario_batch();

    let values: Vec<i64> = batch
        .column("value")
        .unwrap()
        .into_iter()
        .filter_map(FieldValue::as_i64)
        .collect();
    assert_eq!(values, vec![10, 20, 30]);

    assert!(batch.contains(&FieldValue::from("timestamp")));
    assert!(!batch.contains(&FieldValue::Integer(START)));

    let owned = batch.row_owned(-1).unwrap();
    assert_eq!(owned.get("user_id"), Some(&FieldValue::from("u3")));

    let err = batch.column("missing").unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::UnknownColumn);

    let err = batch.get_by_value(&FieldValue::Null).unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::IndexType);
}

// =============================================================================
// Concatenation Tests
// =============================================================================

/// Compatible batches concatenate in argument order.
#[test]
fn test_concat_compatible() {
    let rows = scenario_rows();
    let left = WindowBatch::new(&rows[..1], START, END, SCHEMA, true).unwrap();
    let right = WindowBatch::new(&rows[1..], START, END, SCHEMA, true).unwrap();

    let combined = (&left + &right).unwrap();
    assert_eq!(combined.len(), 3);
    assert_eq!(combined, scenario_batch());
}

/// Each kind of metadata mismatch has its own error.
#[test]
fn test_concat_mismatches() {
    let rows = scenario_rows();
    let base = WindowBatch::new(&rows, START, END, SCHEMA, true).unwrap();

    let wider = WindowBatch::new(&rows, START, END + 1, SCHEMA, true).unwrap();
    assert_eq!((&base + &wider).unwrap_err().code(), BatchErrorCode::WindowMismatch);

    let unordered = WindowBatch::new(&rows, START, END, SCHEMA, false).unwrap();
    assert_eq!((&base + &unordered).unwrap_err().code(), BatchErrorCode::PolicyMismatch);

    let other_schema = WindowBatch::new(
        &[Row::from_json(&json!({"timestamp": START + 1, "v": 1})).unwrap()],
        START,
        END,
        ["timestamp", "v"],
        true,
    )
    .unwrap();
    assert_eq!((&base + &other_schema).unwrap_err().code(), BatchErrorCode::SchemaMismatch);
}

/// Only window batches are accepted operands.
#[test]
fn test_concat_unsupported_operands() {
    let base = scenario_batch();
    let shard = ShardBatch::new(&[Row::from_json(&json!({"shard_id": 1})).unwrap()]).unwrap();
    let rows = scenario_rows();
    let value = FieldValue::from(json!([]));

    for err in [
        base.combine(&shard).unwrap_err(),
        base.combine(&rows).unwrap_err(),
        base.combine(&value).unwrap_err(),
    ] {
        assert_eq!(err.code(), BatchErrorCode::UnsupportedOperand);
        assert_eq!(err.category(), ErrorCategory::Unsupported);
    }
}

// =============================================================================
// Rendering Tests
// =============================================================================

/// Rendering shows the window and a truncated preview.
#[test]
fn test_display_preview() {
    let text = scenario_batch().to_string();
    assert!(text.starts_with(
        "WindowBatch(start=1700000000, end=1700001000, rows=3, cols=[timestamp, user_id, value])["
    ));
    assert!(text.contains("... (1 more rows)"));

    // Same layout as ShardBatch, empty batches included
    let empty = scenario_batch().slice(0, 0).unwrap();
    assert_eq!(
        empty.to_string(),
        "WindowBatch(start=1700000000, end=1700001000, rows=0, cols=[timestamp, user_id, value])[]"
    );
    let one = scenario_batch().slice(0, 1).unwrap().to_string();
    assert!(one.ends_with("\"value\": 10},\n]"));
}
