//! Report encoding
//!
//! This module wraps engine output into the versioned report envelope handed
//! to the presentation layer.

use crate::error::{AnalyticsError, Result};
use crate::normalizer::ReferenceOffset;
use crate::types::{ActivityDayKey, AnalyticsOutput, AnalyticsReport, ReportProducer};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for analytics report envelopes
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap engine output for one canonical day
    pub fn encode(
        &self,
        output: &AnalyticsOutput,
        snapshot_key: &str,
        today: ActivityDayKey,
        offset: ReferenceOffset,
    ) -> AnalyticsReport {
        AnalyticsReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_for_day: today,
            reference_offset_minutes: offset.minutes(),
            snapshot_key: snapshot_key.to_string(),
            stats: output.stats.clone(),
            calendar: output.calendar.clone(),
            daily_window: output.daily_window.clone(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        output: &AnalyticsOutput,
        snapshot_key: &str,
        today: ActivityDayKey,
        offset: ReferenceOffset,
    ) -> Result<String> {
        let report = self.encode(output, snapshot_key, today, offset);
        serde_json::to_string_pretty(&report).map_err(|e| AnalyticsError::Encoding(e.to_string()))
    }
}
