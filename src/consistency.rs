//! Consistency and average calculation
//!
//! Derives the dashboard's headline numbers from day buckets: consistency
//! percentage, daily average, the display series, per-category routine
//! completion and engagement streaks.

use crate::config::DEFAULT_SERIES_UNIT_WEIGHT;
use crate::period::{day_label, PeriodSpec};
use crate::schema::RoutineRecord;
use crate::types::{
    BucketSeries, ConsistencySummary, DayBucket, RoutineBreakdown, RoutineCategory, SeriesPoint,
    Streaks,
};
use chrono::NaiveDate;

/// Calculator for consistency summaries
#[derive(Debug, Clone, Copy)]
pub struct ConsistencyCalculator {
    unit_weight: u32,
}

impl Default for ConsistencyCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_SERIES_UNIT_WEIGHT)
    }
}

impl ConsistencyCalculator {
    pub fn new(unit_weight: u32) -> Self {
        Self { unit_weight }
    }

    /// Summarize bucketed counts against the possible micro-units of the period
    pub fn summarize(
        &self,
        series: &BucketSeries,
        total_possible_units: u32,
        period: &PeriodSpec,
    ) -> ConsistencySummary {
        let completed = series.completed_total;

        ConsistencySummary {
            consistency_percent: percent(completed, total_possible_units),
            daily_average: if period.day_count > 0 {
                completed as f64 / period.day_count as f64
            } else {
                0.0
            },
            weekly_series: self.display_series(&series.buckets),
        }
    }

    /// One point per bucket; saturates at 100 once a day reaches 100/weight units.
    ///
    /// This is a display curve, unrelated to `consistency_percent`.
    pub fn display_series(&self, buckets: &[DayBucket]) -> Vec<SeriesPoint> {
        buckets
            .iter()
            .map(|bucket| SeriesPoint {
                date: bucket.date,
                day_label: day_label(bucket.date),
                value: bucket
                    .completed_count
                    .saturating_mul(self.unit_weight)
                    .min(100) as u8,
            })
            .collect()
    }
}

/// Possible micro-units: every task, every routine slot, every journal-eligible day
pub fn possible_units(task_count: usize, routines: &[RoutineRecord], journal_days: u32) -> u32 {
    let routine_slots: u32 = routines.iter().map(|r| r.slot_count()).sum();
    task_count as u32 + routine_slots + journal_days
}

/// Completion percentage per time-of-day category, over routine slots
pub fn routine_breakdown(routines: &[RoutineRecord]) -> RoutineBreakdown {
    let mut totals = [(0u32, 0u32); 3];

    for routine in routines {
        let slot = match routine.category() {
            RoutineCategory::Morning => 0,
            RoutineCategory::Afternoon => 1,
            RoutineCategory::Night => 2,
            RoutineCategory::Other => continue,
        };
        totals[slot].0 += routine.completed_slots();
        totals[slot].1 += routine.slot_count();
    }

    RoutineBreakdown {
        morning: percent(totals[0].0, totals[0].1),
        afternoon: percent(totals[1].0, totals[1].1),
        night: percent(totals[2].0, totals[2].1),
    }
}

/// Runs of consecutive days with at least one micro-unit.
///
/// Buckets after `today` are ignored. An empty `today` does not break the
/// current streak since the day is still in progress.
pub fn streaks(buckets: &[DayBucket], today: NaiveDate) -> Streaks {
    let elapsed: Vec<&DayBucket> = buckets.iter().filter(|b| b.date <= today).collect();

    let mut longest = 0u32;
    let mut run = 0u32;
    for bucket in &elapsed {
        if bucket.completed_count > 0 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    let mut trailing = elapsed.iter().rev().peekable();
    if let Some(last) = trailing.peek() {
        if last.date == today && last.completed_count == 0 {
            trailing.next();
        }
    }
    let current = trailing.take_while(|b| b.completed_count > 0).count() as u32;

    Streaks { current, longest }
}

/// round(100 * part / whole), clamped to 0-100; 0 when `whole` is 0
fn percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let value = (100.0 * part as f64 / whole as f64).round();
    value.clamp(0.0, 100.0) as u8
}
