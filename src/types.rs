//! Core types for the FocusPro Insights pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: normalized raw events, day buckets, mood statistics, insights and
//! the final metrics result consumed by the presentation layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Mood logged with a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Neutral,
    Bad,
    Terrible,
}

impl Mood {
    /// All moods, best first
    pub const ALL: [Mood; 5] = [
        Mood::Great,
        Mood::Good,
        Mood::Neutral,
        Mood::Bad,
        Mood::Terrible,
    ];

    /// Numeric score on the 1-5 scale
    pub fn score(&self) -> u8 {
        match self {
            Mood::Great => 5,
            Mood::Good => 4,
            Mood::Neutral => 3,
            Mood::Bad => 2,
            Mood::Terrible => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Neutral => "neutral",
            Mood::Bad => "bad",
            Mood::Terrible => "terrible",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Mood::Great | Mood::Good)
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Mood::Bad | Mood::Terrible)
    }
}

/// Routine time-of-day category.
///
/// Source routines carry free-form categories (health, focus, ...); everything
/// outside the three time-of-day buckets collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineCategory {
    Morning,
    Afternoon,
    Night,
    Other,
}

impl RoutineCategory {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "morning" => RoutineCategory::Morning,
            "afternoon" => RoutineCategory::Afternoon,
            "night" => RoutineCategory::Night,
            _ => RoutineCategory::Other,
        }
    }
}

/// Entity type a raw event was normalized from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Task,
    RoutineStep,
    JournalEntry,
}

/// The single normalized event shape consumed by the engine.
///
/// Each variant only carries the fields that are meaningful for its kind, so a
/// task event can never hold a mood score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawEvent {
    /// A task that reached the completed status
    Task { timestamp: DateTime<Utc> },
    /// A routine step toggled to completed
    RoutineStep {
        timestamp: DateTime<Utc>,
        category: RoutineCategory,
    },
    /// A logged journal entry
    JournalEntry {
        timestamp: DateTime<Utc>,
        mood: Mood,
        #[serde(default)]
        reasons: Vec<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
}

impl RawEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RawEvent::Task { .. } => EventKind::Task,
            RawEvent::RoutineStep { .. } => EventKind::RoutineStep,
            RawEvent::JournalEntry { .. } => EventKind::JournalEntry,
        }
    }

    /// Instant the event became complete
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RawEvent::Task { timestamp }
            | RawEvent::RoutineStep { timestamp, .. }
            | RawEvent::JournalEntry { timestamp, .. } => *timestamp,
        }
    }

    pub fn mood(&self) -> Option<Mood> {
        match self {
            RawEvent::JournalEntry { mood, .. } => Some(*mood),
            _ => None,
        }
    }

    pub fn mood_score(&self) -> Option<u8> {
        self.mood().map(|m| m.score())
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            RawEvent::JournalEntry { reasons, .. } => reasons,
            _ => &[],
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            RawEvent::JournalEntry { tags, .. } => tags,
            _ => &[],
        }
    }

    pub fn routine_category(&self) -> Option<RoutineCategory> {
        match self {
            RawEvent::RoutineStep { category, .. } => Some(*category),
            _ => None,
        }
    }
}

/// Completed micro-units for one calendar day of the reference time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub completed_count: u32,
}

/// Output of the day-bucket aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSeries {
    /// One bucket per series day, zero-filled
    pub buckets: Vec<DayBucket>,
    /// Micro-units completed anywhere inside the period
    pub completed_total: u32,
}

/// One point of the display series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub day_label: String,
    /// 0-100
    pub value: u8,
}

/// Consistency summary derived from buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencySummary {
    /// 0-100
    pub consistency_percent: u8,
    pub daily_average: f64,
    pub weekly_series: Vec<SeriesPoint>,
}

/// Per-category routine completion (0-100 each)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineBreakdown {
    pub morning: u8,
    pub afternoon: u8,
    pub night: u8,
}

/// Runs of consecutive engaged days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Three-level classification of mood standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityTier {
    Low,
    Moderate,
    High,
}

/// Occurrences of each mood
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodDistribution {
    pub great: u32,
    pub good: u32,
    pub neutral: u32,
    pub bad: u32,
    pub terrible: u32,
}

impl MoodDistribution {
    pub fn count(&self, mood: Mood) -> u32 {
        match mood {
            Mood::Great => self.great,
            Mood::Good => self.good,
            Mood::Neutral => self.neutral,
            Mood::Bad => self.bad,
            Mood::Terrible => self.terrible,
        }
    }

    pub fn increment(&mut self, mood: Mood) -> u32 {
        let slot = match mood {
            Mood::Great => &mut self.great,
            Mood::Good => &mut self.good,
            Mood::Neutral => &mut self.neutral,
            Mood::Bad => &mut self.bad,
            Mood::Terrible => &mut self.terrible,
        };
        *slot += 1;
        *slot
    }

    pub fn positive(&self) -> u32 {
        self.great + self.good
    }

    pub fn negative(&self) -> u32 {
        self.bad + self.terrible
    }
}

/// Mood statistics for a set of journal events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodStats {
    pub entry_count: u32,
    pub predominant_mood: Mood,
    pub mean: f64,
    /// Population variance (divisor n)
    pub variance: f64,
    pub std_dev: f64,
    pub volatility_tier: VolatilityTier,
    pub distribution: MoodDistribution,
    pub positive_count: u32,
    pub negative_count: u32,
}

/// A label with its occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedLabel {
    pub label: String,
    pub count: u32,
}

/// Journal mood on one day, in chronological order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodPoint {
    pub timestamp: DateTime<Utc>,
    pub date: NaiveDate,
    pub mood: Mood,
    pub score: u8,
}

/// Mean mood per weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayMood {
    pub day_label: String,
    pub entry_count: u32,
    /// 0 when no entries fall on the weekday
    pub average: f64,
}

/// Good/bad day tally for the trailing seven days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyEvaluation {
    pub good_days: u32,
    pub bad_days: u32,
    pub top_reason: Option<String>,
}

/// Narrative outcome selected by the insight classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Mixed,
    Positive,
    Challenging,
    Balanced,
}

/// Signals the classifier based its decision on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightEvidence {
    pub volatility_tier: VolatilityTier,
    pub completed_count: u32,
    pub positive_count: u32,
    pub negative_count: u32,
}

/// Fixed narrative shown on the journal and dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub body: String,
    pub suggestion: String,
    pub evidence: InsightEvidence,
}

/// The engine's sole output for a `(user, period)` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    /// 0-100
    pub consistency_percent: u8,
    pub daily_average: f64,
    pub completed_units: u32,
    pub possible_units: u32,
    pub weekly_series: Vec<SeriesPoint>,
    pub routine_category_percent: RoutineBreakdown,
    pub streaks: Streaks,
    /// None when no journal entries exist in the period
    pub mood_stats: Option<MoodStats>,
    pub top_reasons: Vec<RankedLabel>,
    pub top_tags: Vec<RankedLabel>,
    pub mood_timeline: Vec<MoodPoint>,
    pub weekday_mood: Vec<WeekdayMood>,
    pub weekly_evaluation: Option<WeeklyEvaluation>,
    /// None whenever `mood_stats` is None
    pub insight: Option<Insight>,
}

/// Producer metadata of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Resolved period as carried by a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub token: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub day_count: u32,
    pub timezone: String,
}

/// Envelope around a `MetricsResult`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub report_version: String,
    pub producer: ReportProducer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub period: ReportPeriod,
    pub computed_at_utc: String,
    pub metrics: MetricsResult,
}
