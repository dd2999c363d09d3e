//! Pipeline orchestration
//!
//! This module provides the stateless public API of FocusPro Insights. It runs
//! the full pipeline for one `(user, period)` request: record filtering →
//! event normalization → day bucketing → consistency summary → mood
//! statistics → insight classification.

use crate::buckets::DayBucketAggregator;
use crate::config::EngineConfig;
use crate::consistency::{possible_units, routine_breakdown, streaks, ConsistencyCalculator};
use crate::encoder::MetricsEncoder;
use crate::error::ComputeError;
use crate::insight::InsightClassifier;
use crate::mood::MoodAnalyzer;
use crate::period::{PeriodResolver, PeriodSpec};
use crate::schema::{DataSnapshot, JournalRecord, RecordAdapter, RoutineRecord, TaskRecord};
use crate::types::MetricsResult;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Compute metrics for a snapshot and a period token.
///
/// # Arguments
/// * `snapshot` - All records of one user
/// * `period_token` - Period name (`today`, `week`, `mês`, ...)
/// * `now` - Current instant; the only clock the engine reads
/// * `config` - Engine configuration
///
/// # Returns
/// The resolved period and the metrics computed over it
pub fn compute_metrics(
    snapshot: &DataSnapshot,
    period_token: &str,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<(PeriodSpec, MetricsResult), ComputeError> {
    let pipeline = MetricsPipeline::new(config)?;
    let period = pipeline.resolver().resolve(period_token, now)?;
    let metrics = pipeline.compute_snapshot(snapshot, &period, now);
    Ok((period, metrics))
}

/// Convert a JSON snapshot into a pretty-printed metrics report.
///
/// # Example
/// ```ignore
/// let report = snapshot_to_report(
///     snapshot_json,
///     "week",
///     Utc::now(),
///     "America/Sao_Paulo",
/// )?;
/// ```
pub fn snapshot_to_report(
    snapshot_json: &str,
    period_token: &str,
    now: DateTime<Utc>,
    timezone: &str,
) -> Result<String, ComputeError> {
    let snapshot = RecordAdapter::parse_snapshot(snapshot_json)?;
    RecordAdapter::ensure_valid(&snapshot)?;

    let config = EngineConfig::with_timezone(timezone);
    let (period, metrics) = compute_metrics(&snapshot, period_token, now, &config)?;

    MetricsEncoder::new().encode_to_json(snapshot.user_id.as_deref(), &period, &metrics)
}

/// Configured pipeline stages
#[derive(Debug, Clone)]
pub struct MetricsPipeline {
    resolver: PeriodResolver,
    calculator: ConsistencyCalculator,
    mood: MoodAnalyzer,
}

impl MetricsPipeline {
    /// Build the pipeline from a validated configuration
    pub fn new(config: &EngineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        let timezone = config.tz()?;

        Ok(Self {
            resolver: PeriodResolver::new(timezone, config.all_time_day_count),
            calculator: ConsistencyCalculator::new(config.series_unit_weight),
            mood: MoodAnalyzer::new(timezone, config.top_n),
        })
    }

    pub fn resolver(&self) -> &PeriodResolver {
        &self.resolver
    }

    pub fn compute_snapshot(
        &self,
        snapshot: &DataSnapshot,
        period: &PeriodSpec,
        now: DateTime<Utc>,
    ) -> MetricsResult {
        self.compute(
            &snapshot.tasks,
            &snapshot.routines,
            &snapshot.journal_entries,
            period,
            now,
        )
    }

    /// Span of journal entries `compute` needs for `period` at `now`: the
    /// period plus the trailing week read by the weekly evaluation
    pub fn journal_span(&self, period: &PeriodSpec, now: DateTime<Utc>) -> PeriodSpec {
        match self.mood.evaluation_start(now) {
            Some(from) => {
                let until = now.checked_add_signed(Duration::nanoseconds(1)).unwrap_or(now);
                period.widened(from, until)
            }
            None => period.clone(),
        }
    }

    /// Run every stage over the records of one user.
    ///
    /// Routines are not period-filtered: their current snapshot stands for
    /// today's activity. `journal` may reach outside the period; only the
    /// weekly evaluation reads entries before `period.start`.
    pub fn compute(
        &self,
        tasks: &[TaskRecord],
        routines: &[RoutineRecord],
        journal: &[JournalRecord],
        period: &PeriodSpec,
        now: DateTime<Utc>,
    ) -> MetricsResult {
        // Weekly evaluation windows the journal itself
        let weekly_evaluation = self
            .mood
            .evaluate_week(&RecordAdapter::journal_events(journal), now);

        // Stage 1: keep records that belong to the period
        let tasks: Vec<TaskRecord> = tasks
            .iter()
            .filter(|t| task_in_period(t, period))
            .cloned()
            .collect();
        let journal: Vec<JournalRecord> = journal
            .iter()
            .filter(|j| period.contains(j.date))
            .cloned()
            .collect();
        debug!(
            tasks = tasks.len(),
            routines = routines.len(),
            journal = journal.len(),
            "filtered records"
        );

        // Stage 2: normalize into one event stream
        let events = RecordAdapter::to_events(&tasks, routines, &journal, now);
        let journal_events = RecordAdapter::journal_events(&journal);

        // Stage 3: bucket by local day
        let series = DayBucketAggregator::bucket(&events, period);

        // Stage 4: consistency summary
        let possible = possible_units(tasks.len(), routines, period.day_count);
        let summary = self.calculator.summarize(&series, possible, period);
        let streaks = streaks(&series.buckets, period.local_date(now));
        debug!(
            completed = series.completed_total,
            possible,
            consistency = summary.consistency_percent,
            "summarized consistency"
        );

        // Stage 5: mood statistics
        let mood_stats = self.mood.analyze(&journal_events);

        // Stage 6: insight, only when there is mood data
        let insight = mood_stats.as_ref().map(|stats| {
            InsightClassifier::classify(
                stats,
                series.completed_total,
                stats.negative_count,
                stats.positive_count,
            )
        });
        debug!(
            entries = journal_events.len(),
            insight = ?insight.as_ref().map(|i| i.kind),
            "analyzed mood"
        );

        MetricsResult {
            consistency_percent: summary.consistency_percent,
            daily_average: summary.daily_average,
            completed_units: series.completed_total,
            possible_units: possible,
            weekly_series: summary.weekly_series,
            routine_category_percent: routine_breakdown(routines),
            streaks,
            top_reasons: self.mood.top_reasons(&journal_events),
            top_tags: self.mood.top_tags(&journal_events),
            mood_timeline: self.mood.timeline(&journal_events),
            weekday_mood: self.mood.weekday_averages(&journal_events),
            weekly_evaluation,
            mood_stats,
            insight,
        }
    }
}

/// A task belongs to the period when it was created or completed inside it
fn task_in_period(task: &TaskRecord, period: &PeriodSpec) -> bool {
    period.contains(task.created_at) || task.completion_time().is_some_and(|t| period.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RoutineStepRecord, TaskStatus};
    use crate::types::{InsightKind, Mood, VolatilityTier};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn ts(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    fn utc_config() -> EngineConfig {
        EngineConfig::with_timezone("UTC")
    }

    fn task(id: &str, day: u32, status: TaskStatus) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            status,
            created_at: ts(day, 8),
            completed_at: status.is_completed().then(|| ts(day, 17)),
        }
    }

    fn journal(id: &str, day: u32, mood: Mood, reasons: &[&str]) -> JournalRecord {
        JournalRecord {
            id: id.to_string(),
            date: ts(day, 21),
            mood,
            reasons: reasons.iter().map(|s| s.to_string()).collect(),
            tags: vec![],
        }
    }

    fn sample_snapshot_json() -> &'static str {
        r#"{
            "schema_version": "focuspro.snapshot.v1",
            "user_id": "user-42",
            "tasks": [
                { "id": "t1", "status": "completed", "created_at": "2024-03-04T09:00:00Z", "completed_at": "2024-03-04T15:00:00Z" },
                { "id": "t2", "status": "pending", "created_at": "2024-03-05T09:00:00Z" }
            ],
            "routines": [
                { "id": "r1", "title": "Rotina Matinal", "category": "morning",
                  "steps": [
                    { "id": "s1", "completed": true, "completed_at": "2024-03-05T07:00:00Z" },
                    { "id": "s2", "completed": false }
                  ] }
            ],
            "journal_entries": [
                { "id": "j1", "date": "2024-03-05T21:00:00Z", "mood": "good", "reasons": ["Dormi bem"], "tags": ["Sono"] }
            ]
        }"#
    }

    #[test]
    fn test_full_week_one_task_per_day() {
        let mut snapshot = DataSnapshot::new("user-1");
        snapshot.tasks = (4..=10)
            .map(|d| task(&format!("t{d}"), d, TaskStatus::Completed))
            .collect();

        let pipeline = MetricsPipeline::new(&utc_config()).unwrap();
        let period = pipeline.resolver().resolve("week", ts(10, 22)).unwrap();
        let events = RecordAdapter::to_events(&snapshot.tasks, &[], &[], ts(10, 22));
        let series = DayBucketAggregator::bucket(&events, &period);
        let summary = ConsistencyCalculator::default().summarize(&series, 7, &period);

        assert_eq!(summary.consistency_percent, 100);
        assert_eq!(summary.daily_average, 1.0);

        let (_, metrics) = compute_metrics(&snapshot, "week", ts(10, 22), &utc_config()).unwrap();
        assert_eq!(metrics.completed_units, 7);
        // 7 tasks + 7 journal-eligible days
        assert_eq!(metrics.possible_units, 14);
        assert_eq!(metrics.consistency_percent, 50);
        assert_eq!(metrics.streaks.current, 7);
    }

    #[test]
    fn test_no_journal_means_no_mood_or_insight() {
        let mut snapshot = DataSnapshot::new("user-1");
        snapshot.tasks.push(task("t1", 5, TaskStatus::Completed));

        let (period, metrics) =
            compute_metrics(&snapshot, "week", ts(6, 12), &utc_config()).unwrap();
        assert!(metrics.mood_stats.is_none());
        assert!(metrics.insight.is_none());
        assert!(metrics.weekly_evaluation.is_none());
        assert!(metrics.top_reasons.is_empty());
        assert_eq!(metrics.weekly_series.len(), period.day_count as usize);
    }

    #[test]
    fn test_mood_pipeline() {
        let mut snapshot = DataSnapshot::new("user-1");
        snapshot.journal_entries = vec![
            journal("j1", 4, Mood::Great, &["Produtivo"]),
            journal("j2", 5, Mood::Great, &["Produtivo"]),
            journal("j3", 6, Mood::Bad, &["Cansaço"]),
            journal("j4", 7, Mood::Neutral, &[]),
            journal("j5", 8, Mood::Good, &[]),
            // Previous week, excluded
            journal("j0", 1, Mood::Terrible, &["Cansaço", "Cansaço"]),
        ];

        let (_, metrics) = compute_metrics(&snapshot, "week", ts(10, 12), &utc_config()).unwrap();
        let stats = metrics.mood_stats.unwrap();
        assert_eq!(stats.entry_count, 5);
        assert_eq!(stats.predominant_mood, Mood::Great);
        assert_eq!(stats.volatility_tier, VolatilityTier::Moderate);

        let insight = metrics.insight.unwrap();
        assert_eq!(insight.kind, InsightKind::Positive);
        assert_eq!(insight.evidence.completed_count, 5);

        assert_eq!(metrics.top_reasons[0].label, "Produtivo");
        assert_eq!(metrics.mood_timeline.len(), 5);
        assert_eq!(metrics.weekday_mood[0].average, 5.0);
    }

    #[test]
    fn test_weekly_evaluation_reaches_before_period() {
        let mut snapshot = DataSnapshot::new("user-1");
        snapshot.journal_entries = vec![
            journal("j1", 4, Mood::Bad, &["Cansaço"]),
            journal("j2", 5, Mood::Bad, &["Cansaço"]),
        ];

        let (_, today) = compute_metrics(&snapshot, "today", ts(6, 12), &utc_config()).unwrap();
        assert!(today.mood_stats.is_none());
        let eval = today.weekly_evaluation.as_ref().unwrap();
        assert_eq!(eval.good_days, 0);
        assert_eq!(eval.bad_days, 2);
        assert_eq!(eval.top_reason.as_deref(), Some("Cansaço"));

        let (_, week) = compute_metrics(&snapshot, "week", ts(6, 12), &utc_config()).unwrap();
        assert_eq!(today.weekly_evaluation, week.weekly_evaluation);
    }

    #[test]
    fn test_journal_span_covers_trailing_week() {
        let pipeline = MetricsPipeline::new(&utc_config()).unwrap();
        let now = ts(6, 12);

        let today = pipeline.resolver().resolve("today", now).unwrap();
        let span = pipeline.journal_span(&today, now);
        assert_eq!(span.start, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
        assert_eq!(span.end, today.end);
        assert_eq!(span.day_count, 1);

        let yesterday = pipeline.resolver().resolve("yesterday", now).unwrap();
        let span = pipeline.journal_span(&yesterday, now);
        assert!(span.contains(now));
        assert!(!span.contains(now + Duration::seconds(1)));

        let month = pipeline.resolver().resolve("month", now).unwrap();
        assert_eq!(pipeline.journal_span(&month, now).start, month.start.min(span.start));
    }

    #[test]
    fn test_tasks_outside_period_are_not_possible_units() {
        let mut snapshot = DataSnapshot::new("user-1");
        snapshot.tasks = vec![
            task("old", 1, TaskStatus::Pending),
            task("open", 5, TaskStatus::Pending),
            task("done", 6, TaskStatus::Completed),
        ];

        let (_, metrics) = compute_metrics(&snapshot, "today", ts(6, 20), &utc_config()).unwrap();
        assert_eq!(metrics.possible_units, 1 + 1);
        assert_eq!(metrics.completed_units, 1);
        assert_eq!(metrics.consistency_percent, 50);
    }

    #[test]
    fn test_routine_steps_count_on_completion_day() {
        let mut snapshot = DataSnapshot::new("user-1");
        snapshot.routines = vec![RoutineRecord {
            id: "r1".to_string(),
            title: "Noite".to_string(),
            category: "night".to_string(),
            steps: vec![
                RoutineStepRecord {
                    id: "s1".to_string(),
                    completed: true,
                    completed_at: Some(ts(5, 22)),
                },
                RoutineStepRecord {
                    id: "s2".to_string(),
                    completed: false,
                    completed_at: None,
                },
            ],
            completed: false,
            updated_at: None,
        }];

        let (_, metrics) = compute_metrics(&snapshot, "week", ts(6, 12), &utc_config()).unwrap();
        assert_eq!(metrics.weekly_series[1].value, 10);
        assert_eq!(metrics.routine_category_percent.night, 50);
        assert_eq!(metrics.possible_units, 2 + 7);
    }

    #[test]
    fn test_idempotent() {
        let snapshot = RecordAdapter::parse_snapshot(sample_snapshot_json()).unwrap();
        let a = compute_metrics(&snapshot, "month", ts(6, 12), &utc_config()).unwrap();
        let b = compute_metrics(&snapshot, "month", ts(6, 12), &utc_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_snapshot_to_report() {
        let report = snapshot_to_report(sample_snapshot_json(), "semana", ts(6, 12), "UTC").unwrap();

        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["producer"]["name"], "focuspro-insights");
        assert_eq!(value["user_id"], "user-42");
        assert_eq!(value["period"]["token"], "week");
        assert_eq!(value["period"]["day_count"], 7);
        assert_eq!(value["metrics"]["completed_units"], 3);
        assert_eq!(value["metrics"]["weekly_series"].as_array().unwrap().len(), 7);
        assert_eq!(value["metrics"]["mood_stats"]["predominant_mood"], "good");
    }

    #[test]
    fn test_invalid_period_token() {
        let result = snapshot_to_report(sample_snapshot_json(), "quarter", ts(6, 12), "UTC");
        assert!(matches!(result, Err(ComputeError::InvalidPeriod(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = snapshot_to_report("not valid json", "week", ts(6, 12), "UTC");
        assert!(matches!(result, Err(ComputeError::ParseError(_))));
    }

    #[test]
    fn test_invalid_timezone() {
        let result = snapshot_to_report(sample_snapshot_json(), "week", ts(6, 12), "Nowhere/City");
        assert!(matches!(result, Err(ComputeError::InvalidTimezone(_))));
    }
}
