//! Schema validation for batch rows
//!
//! A schema is a non-empty, ordered list of unique column names. Rows are
//! checked against it either by exact key sequence or by key set.
//!
//! # Design Principles
//!
//! - Schema is immutable after construction
//! - No schema inference beyond reading the first row's keys (ShardBatch)
//! - No type coercion
//! - Deterministic validation, first failure wins

mod policy;
mod validator;

pub use policy::ValidationPolicy;
pub use validator::SchemaValidator;
