//! Error types for FocusPro Insights

use crate::source::FetchError;
use thiserror::Error;

/// Errors that can occur during metrics computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Data fetch failed: {0}")]
    DataFetchFailed(#[from] FetchError),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Recompute superseded: request {requested} lost to request {latest}")]
    Superseded { requested: u64, latest: u64 },
}

impl ComputeError {
    /// True when the failure came from the external data collaborator
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, ComputeError::DataFetchFailed(_))
    }
}
