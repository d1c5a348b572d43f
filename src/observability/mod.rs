//! Observability for the batch layer
//!
//! Provides:
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on validation results
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use rowbatch::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::BatchBuilt, &[("kind", "ShardBatch"), ("rows", "5")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

use crate::errors::BatchError;

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

/// Log a rejected batch operation.
pub(crate) fn log_rejection(kind: &str, err: &BatchError) {
    if !Logger::enabled(Event::BatchRejected.severity()) {
        return;
    }
    let row = err.row().map(|r| r.to_string()).unwrap_or_default();
    log_event_with_fields(
        Event::BatchRejected,
        &[
            ("kind", kind),
            ("code", err.code().code()),
            ("row", &row),
            ("message", err.message()),
        ],
    );
}

/// Log a successfully built batch.
pub(crate) fn log_built(event: Event, kind: &str, rows: usize) {
    if !Logger::enabled(event.severity()) {
        return;
    }
    let rows = rows.to_string();
    log_event_with_fields(event, &[("kind", kind), ("rows", &rows)]);
}
