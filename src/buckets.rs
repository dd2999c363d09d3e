//! Day bucketing
//!
//! Places every in-period event on the calendar day (reference time zone) it
//! happened on. One bucket exists per series day even when nothing happened,
//! so sparse data never shortens the series.

use crate::period::PeriodSpec;
use crate::types::{BucketSeries, DayBucket, RawEvent};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregator for per-day engagement counts
pub struct DayBucketAggregator;

impl DayBucketAggregator {
    /// Count completed micro-units per day of the period.
    ///
    /// Every event kind counts as one micro-unit: a completed task, a completed
    /// routine step, or a logged journal entry regardless of its mood. Events
    /// outside `[start, end)` are ignored.
    pub fn bucket(events: &[RawEvent], period: &PeriodSpec) -> BucketSeries {
        let dates = period.series_dates();
        let mut counts: BTreeMap<NaiveDate, u32> = dates.iter().map(|d| (*d, 0)).collect();

        let mut completed_total = 0u32;
        let mut skipped = 0usize;

        for event in events {
            let timestamp = event.timestamp();
            if !period.contains(timestamp) {
                skipped += 1;
                continue;
            }

            completed_total += 1;

            // In-period events before the series window (All) only feed the totals
            if let Some(count) = counts.get_mut(&period.local_date(timestamp)) {
                *count += 1;
            }
        }

        debug!(
            period = %period.period,
            events = events.len(),
            skipped,
            completed_total,
            "bucketed events"
        );

        let buckets = dates
            .into_iter()
            .map(|date| DayBucket {
                date,
                completed_count: counts.get(&date).copied().unwrap_or(0),
            })
            .collect();

        BucketSeries {
            buckets,
            completed_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::PeriodResolver;
    use crate::types::{Mood, RoutineCategory};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    fn week() -> PeriodSpec {
        PeriodResolver::new(chrono_tz::UTC, 30)
            .resolve("week", at(6, 12))
            .unwrap()
    }

    fn journal(ts: DateTime<Utc>) -> RawEvent {
        RawEvent::JournalEntry {
            timestamp: ts,
            mood: Mood::Neutral,
            reasons: vec![],
            tags: vec![],
        }
    }

    #[test]
    fn test_zero_filled_buckets() {
        let series = DayBucketAggregator::bucket(&[], &week());
        assert_eq!(series.buckets.len(), 7);
        assert!(series.buckets.iter().all(|b| b.completed_count == 0));
        assert_eq!(series.completed_total, 0);
    }

    #[test]
    fn test_mixed_kinds_count_as_units() {
        let events = vec![
            RawEvent::Task { timestamp: at(4, 9) },
            RawEvent::RoutineStep {
                timestamp: at(4, 7),
                category: RoutineCategory::Morning,
            },
            journal(at(4, 22)),
            RawEvent::Task { timestamp: at(6, 15) },
        ];

        let series = DayBucketAggregator::bucket(&events, &week());
        let counts: Vec<u32> = series.buckets.iter().map(|b| b.completed_count).collect();
        assert_eq!(counts, vec![3, 0, 1, 0, 0, 0, 0]);
        assert_eq!(series.completed_total, 4);
    }

    #[test]
    fn test_boundaries_are_half_open() {
        let period = week();
        let events = vec![
            RawEvent::Task { timestamp: period.start },
            RawEvent::Task { timestamp: period.end },
            RawEvent::Task {
                timestamp: period.start - Duration::seconds(1),
            },
        ];

        let series = DayBucketAggregator::bucket(&events, &period);
        assert_eq!(series.completed_total, 1);
        assert_eq!(series.buckets[0].completed_count, 1);
        assert_eq!(series.buckets[6].completed_count, 0);
    }

    #[test]
    fn test_reference_zone_day_assignment() {
        let period = PeriodResolver::new(chrono_tz::America::Sao_Paulo, 30)
            .resolve("week", at(6, 12))
            .unwrap();
        // 01:00 UTC on Tuesday is still Monday evening in São Paulo
        let events = vec![RawEvent::Task { timestamp: at(5, 1) }];

        let series = DayBucketAggregator::bucket(&events, &period);
        assert_eq!(series.buckets[0].completed_count, 1);
        assert_eq!(series.buckets[1].completed_count, 0);
    }

    #[test]
    fn test_all_period_counts_history_outside_series() {
        let period = PeriodResolver::new(chrono_tz::UTC, 30)
            .resolve("all", at(6, 12))
            .unwrap();
        let old = Utc.with_ymd_and_hms(2023, 1, 10, 10, 0, 0).unwrap();
        let events = vec![RawEvent::Task { timestamp: old }, RawEvent::Task { timestamp: at(6, 8) }];

        let series = DayBucketAggregator::bucket(&events, &period);
        assert_eq!(series.buckets.len(), 30);
        assert_eq!(series.completed_total, 2);
        assert_eq!(series.buckets.iter().map(|b| b.completed_count).sum::<u32>(), 1);
    }
}
