//! Row validation policy

use serde::{Deserialize, Serialize};

/// How row keys are compared against a schema.
///
/// - `strict_order = true`: the row's key sequence must equal the schema
///   sequence exactly (same names, same order, same count)
/// - `strict_order = false`: the row's key set must equal the schema's set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    pub strict_order: bool,
}

impl ValidationPolicy {
    pub fn strict() -> Self {
        Self { strict_order: true }
    }

    pub fn unordered() -> Self {
        Self {
            strict_order: false,
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

impl From<bool> for ValidationPolicy {
    fn from(strict_order: bool) -> Self {
        Self { strict_order }
    }
}
