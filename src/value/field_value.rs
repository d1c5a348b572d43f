//! Cell values carried by rows
//!
//! Values are tagged, never coerced. The only conversion performed by this
//! crate is timestamp normalization (see `crate::time`).

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use std::fmt;

use super::row::Row;

/// Coarse value kinds used for messages and kind comparisons.
///
/// Integers and floats share the `Number` kind; naive and offset-aware
/// calendar values share the `DateTime` kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    DateTime,
    List,
    Map,
}

impl ValueKind {
    /// Returns the kind name for error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::DateTime => "datetime",
            ValueKind::List => "list",
            ValueKind::Map => "map",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Calendar value without timezone information
    Timestamp(NaiveDateTime),
    /// Calendar value with a fixed UTC offset
    TimestampTz(DateTime<FixedOffset>),
    /// Ordered list of values
    List(Vec<FieldValue>),
    /// Nested row-like mapping
    Map(Row),
}

impl FieldValue {
    /// Returns the coarse kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Null => ValueKind::Null,
            FieldValue::Boolean(_) => ValueKind::Boolean,
            FieldValue::Integer(_) | FieldValue::Float(_) => ValueKind::Number,
            FieldValue::String(_) => ValueKind::String,
            FieldValue::Timestamp(_) | FieldValue::TimestampTz(_) => ValueKind::DateTime,
            FieldValue::List(_) => ValueKind::List,
            FieldValue::Map(_) => ValueKind::Map,
        }
    }

    /// Precise type name, distinguishing integers from floats and naive from
    /// offset-aware calendar values.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Timestamp(_) => "datetime",
            FieldValue::TimestampTz(_) => "datetime[tz]",
            other => other.kind().as_str(),
        }
    }

    /// True for the "absent or empty" sentinels: null, false, zero, the empty
    /// string and empty collections.
    pub fn is_falsy(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Boolean(b) => !b,
            FieldValue::Integer(i) => *i == 0,
            FieldValue::Float(f) => *f == 0.0,
            FieldValue::String(s) => s.is_empty(),
            FieldValue::Timestamp(_) | FieldValue::TimestampTz(_) => false,
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Map(row) => row.is_empty(),
        }
    }

    /// Value equality: integers and floats compare numerically, so
    /// `Integer(3)` equals `Float(3.0)`. Lists and maps compare element-wise
    /// with the same rule; every other pairing uses `==`.
    pub fn value_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Integer(i), FieldValue::Float(f))
            | (FieldValue::Float(f), FieldValue::Integer(i)) => *f == *i as f64,
            (FieldValue::List(a), FieldValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.value_eq(y))
            }
            (FieldValue::Map(a), FieldValue::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.value_eq(w)))
            }
            _ => self == other,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Row> {
        match self {
            FieldValue::Map(row) => Some(row),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{:?}", x),
            FieldValue::String(s) => write!(f, "{:?}", s),
            FieldValue::Timestamp(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            FieldValue::TimestampTz(dt) => write!(f, "{}", dt.to_rfc3339()),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            FieldValue::Map(row) => write!(f, "{}", row),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Integer(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(dt: NaiveDateTime) -> Self {
        FieldValue::Timestamp(dt)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        FieldValue::TimestampTz(dt)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FieldValue::TimestampTz(dt.fixed_offset())
    }
}

impl From<Row> for FieldValue {
    fn from(row: Row) -> Self {
        FieldValue::Map(row)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// JSON strings stay strings; JSON carries no calendar type.
impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => FieldValue::Null,
            JsonValue::Bool(b) => FieldValue::Boolean(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => FieldValue::String(s),
            JsonValue::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            JsonValue::Object(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&JsonValue> for FieldValue {
    fn from(value: &JsonValue) -> Self {
        FieldValue::from(value.clone())
    }
}
