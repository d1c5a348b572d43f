//! Validated row batches
//!
//! Two immutable containers share one read contract (`RowContainer`):
//!
//! - `ShardBatch`: every row carries the same shard identifier
//! - `WindowBatch`: every row's timestamp lies in one half-open window
//!
//! Construction validates and copies the input. Slicing and concatenation
//! return new batches and never touch their inputs.

mod container;
mod index;
mod operand;
mod preview;
mod shard;
mod window;

pub use container::RowContainer;
pub use index::{BatchIndex, Selection};
pub use operand::BatchOperand;
pub use preview::DEFAULT_PREVIEW_ROWS;
pub use shard::{ShardBatch, SHARD_KEY};
pub use window::{WindowBatch, WindowBatchBuilder, TIMESTAMP_COLUMN};
