//! Engine configuration
//!
//! Configuration is plain TOML. Every field is optional:
//!
//! ```toml
//! reference_offset_minutes = 330
//! week_window_days = 7
//! cache_capacity = 32
//!
//! [logging]
//! level = "info"
//! ```

use crate::error::{AnalyticsError, Result};
use crate::normalizer::{DayBucketer, ReferenceOffset};
use crate::periods::DEFAULT_WEEK_WINDOW_DAYS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of snapshots kept by the processor cache
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Reference timezone offset, minutes east of UTC
    #[serde(default)]
    pub reference_offset_minutes: ReferenceOffset,

    /// Length of the trailing "this week" window
    #[serde(default = "default_week_window_days")]
    pub week_window_days: u32,

    /// Snapshots remembered by [`crate::pipeline::AnalyticsProcessor`]
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_offset_minutes: ReferenceOffset::default(),
            week_window_days: default_week_window_days(),
            cache_capacity: default_cache_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "readpulse=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_week_window_days() -> u32 {
    DEFAULT_WEEK_WINDOW_DAYS
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(raw).map_err(|e| AnalyticsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.week_window_days == 0 {
            return Err(AnalyticsError::Config(
                "week_window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Override the reference offset
    pub fn with_offset(mut self, offset: ReferenceOffset) -> Self {
        self.reference_offset_minutes = offset;
        self
    }

    pub fn offset(&self) -> ReferenceOffset {
        self.reference_offset_minutes
    }

    pub fn bucketer(&self) -> DayBucketer {
        DayBucketer::new(self.reference_offset_minutes)
    }
}
