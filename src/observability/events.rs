//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable batch lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Batch constructed and validated
    BatchBuilt,
    /// Batch construction or combination rejected
    BatchRejected,
    /// Batch derived by slicing another batch
    BatchSliced,
    /// Batch derived by concatenation
    BatchCombined,
    /// Configuration file loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BatchBuilt => "BATCH_BUILT",
            Event::BatchRejected => "BATCH_REJECTED",
            Event::BatchSliced => "BATCH_SLICED",
            Event::BatchCombined => "BATCH_COMBINED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::BatchRejected => Severity::Warn,
            Event::ConfigLoaded => Severity::Info,
            Event::BatchBuilt | Event::BatchSliced | Event::BatchCombined => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
