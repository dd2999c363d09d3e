//! FocusPro Insights - Temporal analytics and engagement metrics engine
//!
//! Insights turns a user's tasks, routines and mood-journal entries into
//! dashboard metrics through a deterministic pipeline: period resolution →
//! day bucketing → consistency scoring → mood statistics → insight
//! classification.
//!
//! ## Modules
//!
//! - **Pipeline**: Pure computation over one user's records for a period
//! - **Refresh**: Invalidation-driven recomputation on top of a `DataSource`

pub mod buckets;
pub mod config;
pub mod consistency;
pub mod encoder;
pub mod error;
pub mod insight;
pub mod mood;
pub mod period;
pub mod pipeline;
pub mod refresh;
pub mod schema;
pub mod source;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::EngineConfig;
pub use error::ComputeError;
pub use period::{Period, PeriodResolver, PeriodSpec};
pub use pipeline::{compute_metrics, snapshot_to_report, MetricsPipeline};

// Recompute exports
pub use refresh::{MetricsEngine, PublishedMetrics, RecomputeTrigger, TriggerState};
pub use source::{ChangeNotifier, DataSource, FetchError, MemoryStore};

// Schema exports
pub use schema::{DataSnapshot, RecordAdapter, SCHEMA_VERSION};
pub use types::{MetricsReport, MetricsResult, RawEvent};

/// Insights version embedded in every report
pub const INSIGHTS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for metrics reports
pub const PRODUCER_NAME: &str = "focuspro-insights";
