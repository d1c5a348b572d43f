//! Timestamp normalization
//!
//! Converts timestamp-like values into integer UNIX epoch seconds:
//! - Integers pass through unchanged (already seconds, no unit conversion)
//! - Floats truncate toward zero
//! - Naive calendar values are taken as UTC wall-clock time
//! - Offset-aware calendar values are converted to UTC
//!
//! Falsy values (null, zero, empty) are rejected before anything else, so
//! the epoch instant itself is only expressible as a calendar value.

use chrono::{DateTime, TimeZone};

use crate::errors::{BatchError, BatchResult};
use crate::value::FieldValue;

/// Normalizes a timestamp-like value to UNIX epoch seconds.
///
/// # Errors
///
/// - BATCH_TIMESTAMP_INVALID: value is falsy or a non-finite float
/// - BATCH_TIMESTAMP_TYPE: value is neither numeric nor a calendar value
pub fn normalize_to_unix_ts(value: &FieldValue) -> BatchResult<i64> {
    if value.is_falsy() {
        return Err(BatchError::timestamp_invalid(format!(
            "timestamp must not be empty or zero, got {}",
            value
        )));
    }

    match value {
        FieldValue::Integer(secs) => Ok(*secs),
        FieldValue::Float(secs) => truncate_float(*secs),
        FieldValue::Timestamp(naive) => Ok(truncated_seconds(&naive.and_utc())),
        FieldValue::TimestampTz(aware) => Ok(truncated_seconds(aware)),
        other => Err(BatchError::timestamp_type(other.type_name())),
    }
}

fn truncate_float(secs: f64) -> BatchResult<i64> {
    if !secs.is_finite() {
        return Err(BatchError::timestamp_invalid(format!(
            "timestamp must be finite, got {}",
            secs
        )));
    }
    let truncated = secs.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(BatchError::timestamp_invalid(format!(
            "timestamp {} does not fit in 64-bit seconds",
            secs
        )));
    }
    Ok(truncated as i64)
}

/// Whole seconds since the epoch, truncated toward zero.
///
/// chrono floors pre-epoch instants; a fractional pre-epoch instant is one
/// second closer to zero when truncated.
fn truncated_seconds<Tz: TimeZone>(dt: &DateTime<Tz>) -> i64 {
    let secs = dt.timestamp();
    if secs < 0 && dt.timestamp_subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
