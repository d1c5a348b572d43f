//! Ordered rows and the mapping capability interface
//!
//! A `Row` preserves column insertion order; that order is the row's key
//! sequence for strict schema checks. Anything exposing ordered string keys
//! and values can participate through `RowLike`.

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

use super::field_value::FieldValue;
use crate::errors::{BatchError, BatchResult};

/// One record: column name to value, in insertion order.
///
/// Equality ignores column order, like map equality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: IndexMap<String, FieldValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    /// Builds a row from a JSON object.
    ///
    /// # Errors
    ///
    /// Any JSON shape other than an object is rejected with BATCH_ROW_SHAPE.
    pub fn from_json(value: &JsonValue) -> BatchResult<Self> {
        match FieldValue::from(value) {
            FieldValue::Map(row) => Ok(row),
            other => Err(BatchError::row_shape("Row", other.type_name())),
        }
    }

    /// Inserts or replaces a value. Replacing keeps the column's position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Column names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// Read-only key/value capability that batches accept as row input.
///
/// `column_names` must return keys in the container's iteration order;
/// strict schema checks compare that order.
pub trait RowLike {
    /// Column names in order
    fn column_names(&self) -> Vec<&str>;

    /// Owned copy of the value stored under `key`
    fn field_value(&self, key: &str) -> Option<FieldValue>;

    /// Number of columns
    fn field_count(&self) -> usize {
        self.column_names().len()
    }

    fn has_field(&self, key: &str) -> bool {
        self.column_names().iter().any(|name| *name == key)
    }

    /// Owned copy of the whole row. Nested values are cloned with it.
    fn to_row(&self) -> Row;
}

impl RowLike for Row {
    fn column_names(&self) -> Vec<&str> {
        self.keys().collect()
    }

    fn field_value(&self, key: &str) -> Option<FieldValue> {
        self.get(key).cloned()
    }

    fn field_count(&self) -> usize {
        self.len()
    }

    fn has_field(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn to_row(&self) -> Row {
        self.clone()
    }
}

impl RowLike for IndexMap<String, FieldValue> {
    fn column_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn field_value(&self, key: &str) -> Option<FieldValue> {
        self.get(key).cloned()
    }

    fn has_field(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn to_row(&self) -> Row {
        Row {
            fields: self.clone(),
        }
    }
}

/// Keys come out sorted, so strict order means alphabetical order here.
impl RowLike for BTreeMap<String, FieldValue> {
    fn column_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn field_value(&self, key: &str) -> Option<FieldValue> {
        self.get(key).cloned()
    }

    fn has_field(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn to_row(&self) -> Row {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl RowLike for JsonMap<String, JsonValue> {
    fn column_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn field_value(&self, key: &str) -> Option<FieldValue> {
        self.get(key).map(FieldValue::from)
    }

    fn has_field(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn to_row(&self) -> Row {
        self.iter()
            .map(|(k, v)| (k.clone(), FieldValue::from(v)))
            .collect()
    }
}

impl<T: RowLike + ?Sized> RowLike for &T {
    fn column_names(&self) -> Vec<&str> {
        (**self).column_names()
    }

    fn field_value(&self, key: &str) -> Option<FieldValue> {
        (**self).field_value(key)
    }

    fn field_count(&self) -> usize {
        (**self).field_count()
    }

    fn has_field(&self, key: &str) -> bool {
        (**self).has_field(key)
    }

    fn to_row(&self) -> Row {
        (**self).to_row()
    }
}
