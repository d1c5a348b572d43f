//! rowbatch - Validated, immutable row batches for stream processing
//!
//! Rows are ordered column-to-value mappings. A batch validates every row on
//! construction and never changes afterwards.
//!
//! - `schema`: column-set validation with an ordered or unordered policy
//! - `time`: timestamp normalization to epoch seconds
//! - `batch`: `ShardBatch` and `WindowBatch`
//! - `config`: JSON configuration for defaults and log level
//! - `observability`: JSON-line logging of batch lifecycle events

pub mod batch;
pub mod config;
pub mod errors;
pub mod observability;
pub mod schema;
pub mod time;
pub mod value;

pub use batch::{
    BatchIndex, BatchOperand, RowContainer, Selection, ShardBatch, WindowBatch,
    WindowBatchBuilder,
};
pub use config::{BatchConfig, ConfigError};
pub use errors::{BatchError, BatchErrorCode, BatchResult, ErrorCategory};
pub use schema::{SchemaValidator, ValidationPolicy};
pub use time::normalize_to_unix_ts;
pub use value::{FieldValue, Row, RowLike, ValueKind};
