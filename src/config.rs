//! Engine configuration
//!
//! All tunables of the analytics engine live here. Every field has a default,
//! so a partial JSON document (or none at all) yields a usable configuration.

use crate::error::ComputeError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Reference time zone of the FocusPro product
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Normalization divisor used by the `All` period
pub const DEFAULT_ALL_TIME_DAY_COUNT: u32 = 30;

/// Series points gained per completed micro-unit
pub const DEFAULT_SERIES_UNIT_WEIGHT: u32 = 10;

/// Length of the ranked reasons/tags lists
pub const DEFAULT_TOP_N: usize = 5;

/// Retries for a recompute that lost the sequence race
pub const DEFAULT_MAX_RECOMPUTE_ATTEMPTS: u32 = 3;

/// Configuration for the metrics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA name of the reference time zone used for day bucketing
    pub timezone: String,
    /// Day count reported for the unbounded `All` period
    pub all_time_day_count: u32,
    /// Weight of one micro-unit in the display series
    pub series_unit_weight: u32,
    /// Cap for ranked reasons and tags
    pub top_n: usize,
    /// How many times a superseded recompute is retried
    pub max_recompute_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            all_time_day_count: DEFAULT_ALL_TIME_DAY_COUNT,
            series_unit_weight: DEFAULT_SERIES_UNIT_WEIGHT,
            top_n: DEFAULT_TOP_N,
            max_recompute_attempts: DEFAULT_MAX_RECOMPUTE_ATTEMPTS,
        }
    }
}

impl EngineConfig {
    /// Default configuration with a different reference time zone
    pub fn with_timezone(timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            ..Self::default()
        }
    }

    /// Parse the configured time zone
    pub fn tz(&self) -> Result<Tz, ComputeError> {
        parse_timezone(&self.timezone)
    }

    /// Check every field for a usable value
    pub fn validate(&self) -> Result<(), ComputeError> {
        self.tz()?;

        if self.all_time_day_count == 0 {
            return Err(ComputeError::InvalidConfig(
                "all_time_day_count must be at least 1".to_string(),
            ));
        }
        if self.series_unit_weight == 0 {
            return Err(ComputeError::InvalidConfig(
                "series_unit_weight must be at least 1".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(ComputeError::InvalidConfig(
                "top_n must be at least 1".to_string(),
            ));
        }
        if self.max_recompute_attempts == 0 {
            return Err(ComputeError::InvalidConfig(
                "max_recompute_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Parse an IANA time zone name
pub fn parse_timezone(name: &str) -> Result<Tz, ComputeError> {
    name.parse::<Tz>()
        .map_err(|_| ComputeError::InvalidTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.timezone, "America/Sao_Paulo");
        assert_eq!(config.all_time_day_count, 30);
        assert_eq!(config.top_n, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "timezone": "UTC" }"#).unwrap();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.series_unit_weight, 10);
        assert_eq!(config.tz().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let result = EngineConfig::from_json(r#"{ "timezone": "Mars/Olympus" }"#);
        assert!(matches!(result, Err(ComputeError::InvalidTimezone(_))));
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let result = EngineConfig::from_json(r#"{ "top_n": 0 }"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig::with_timezone("Europe/Lisbon");
        let loaded = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, loaded);
    }
}
