//! Batch configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!   "shard_key": "shard_id",
//!   "timestamp_column": "timestamp",
//!   "strict_order": true,
//!   "preview_rows": 2,
//!   "log_level": "error"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::schema::ValidationPolicy;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Defaults applied when building batches from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Partition column for shard batches
    #[serde(default = "default_shard_key")]
    pub shard_key: String,

    /// Event-time column for window batches
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,

    /// Row validation policy for window batches
    #[serde(default = "default_strict_order")]
    pub strict_order: bool,

    /// Rows shown when rendering a batch
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Minimum log severity: trace, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_shard_key() -> String {
    "shard_id".to_string()
}
fn default_timestamp_column() -> String {
    "timestamp".to_string()
}
fn default_strict_order() -> bool {
    true
}
fn default_preview_rows() -> usize {
    2
}
fn default_log_level() -> String {
    "error".to_string()
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            shard_key: default_shard_key(),
            timestamp_column: default_timestamp_column(),
            strict_order: default_strict_order(),
            preview_rows: default_preview_rows(),
            log_level: default_log_level(),
        }
    }
}

impl BatchConfig {
    /// Load, validate and apply configuration from a file.
    ///
    /// Applying sets the process-wide log threshold.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        config.apply();

        let path_str = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", &path_str)]);

        Ok(config)
    }

    /// Parse and validate configuration without applying it.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: BatchConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.shard_key.is_empty() {
            return Err(ConfigError::invalid("shard_key", "must not be empty"));
        }
        if self.timestamp_column.is_empty() {
            return Err(ConfigError::invalid("timestamp_column", "must not be empty"));
        }
        if self.preview_rows == 0 {
            return Err(ConfigError::invalid("preview_rows", "must be > 0"));
        }
        self.severity()?;
        Ok(())
    }

    /// Parsed log threshold
    pub fn severity(&self) -> ConfigResult<Severity> {
        self.log_level
            .parse()
            .map_err(|reason: String| ConfigError::invalid("log_level", reason))
    }

    /// Validation policy derived from `strict_order`
    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy::from(self.strict_order)
    }

    /// Install the log threshold process-wide.
    pub fn apply(&self) {
        if let Ok(severity) = self.severity() {
            Logger::set_min_severity(severity);
        }
    }
}
