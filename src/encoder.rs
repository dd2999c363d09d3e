//! Report encoding
//!
//! Wraps a `MetricsResult` into a `MetricsReport` envelope carrying producer
//! metadata and the resolved period. Only the envelope is non-deterministic;
//! the inner metrics are passed through untouched.

use crate::error::ComputeError;
use crate::period::PeriodSpec;
use crate::types::{MetricsReport, MetricsResult, ReportPeriod, ReportProducer};
use crate::{INSIGHTS_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for metrics reports
pub struct MetricsEncoder {
    instance_id: String,
}

impl Default for MetricsEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsEncoder {
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

    /// Encode a result computed now
    pub fn encode(
        &self,
        user_id: Option<&str>,
        period: &PeriodSpec,
        metrics: &MetricsResult,
    ) -> MetricsReport {
        self.encode_at(user_id, period, metrics, Utc::now())
    }

    /// Encode a result with an explicit computation instant
    pub fn encode_at(
        &self,
        user_id: Option<&str>,
        period: &PeriodSpec,
        metrics: &MetricsResult,
        computed_at: DateTime<Utc>,
    ) -> MetricsReport {
        MetricsReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: INSIGHTS_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            user_id: user_id.map(str::to_string),
            period: ReportPeriod {
                token: period.period.as_str().to_string(),
                start: period.start,
                end: period.end,
                day_count: period.day_count,
                timezone: period.timezone.name().to_string(),
            },
            computed_at_utc: computed_at.to_rfc3339(),
            metrics: metrics.clone(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        user_id: Option<&str>,
        period: &PeriodSpec,
        metrics: &MetricsResult,
    ) -> Result<String, ComputeError> {
        let report = self.encode(user_id, period, metrics);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}
