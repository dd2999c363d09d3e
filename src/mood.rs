//! Mood statistics
//!
//! Population statistics over journal entries (predominant mood, mean,
//! variance, standard deviation, volatility tier), frequency ranking of
//! reasons and tags, and the journal's weekly views.

use crate::config::DEFAULT_TOP_N;
use crate::period::start_of_day;
use crate::types::{
    Mood, MoodDistribution, MoodPoint, MoodStats, RankedLabel, RawEvent, VolatilityTier,
    WeekdayMood, WeeklyEvaluation,
};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use std::collections::{BTreeMap, HashMap};

/// Upper bound (inclusive) of the `Low` volatility tier
pub const LOW_VOLATILITY_MAX: f64 = 0.8;

/// Upper bound (inclusive) of the `Moderate` volatility tier
pub const MODERATE_VOLATILITY_MAX: f64 = 1.2;

/// Mood score separating good days from bad days
const NEUTRAL_SCORE: f64 = 3.0;

impl VolatilityTier {
    pub fn from_std_dev(std_dev: f64) -> Self {
        if std_dev <= LOW_VOLATILITY_MAX {
            VolatilityTier::Low
        } else if std_dev <= MODERATE_VOLATILITY_MAX {
            VolatilityTier::Moderate
        } else {
            VolatilityTier::High
        }
    }
}

/// Compute mood statistics for chronologically ordered journal events.
///
/// Returns `None` when there are no journal events. Non-journal events are
/// ignored.
///
/// The predominant mood is found with a running max-count scan: a mood only
/// takes the lead when its count strictly exceeds the current maximum, so on a
/// tie the mood that reached the shared count first wins.
pub fn analyze_mood(journal_events: &[RawEvent]) -> Option<MoodStats> {
    let moods: Vec<Mood> = journal_events.iter().filter_map(|e| e.mood()).collect();
    if moods.is_empty() {
        return None;
    }

    let mut distribution = MoodDistribution::default();
    let mut predominant = moods[0];
    let mut max_count = 0u32;
    for mood in &moods {
        let count = distribution.increment(*mood);
        if count > max_count {
            max_count = count;
            predominant = *mood;
        }
    }

    let n = moods.len() as f64;
    let mean = moods.iter().map(|m| m.score() as f64).sum::<f64>() / n;
    let variance = moods
        .iter()
        .map(|m| (m.score() as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    Some(MoodStats {
        entry_count: moods.len() as u32,
        predominant_mood: predominant,
        mean,
        variance,
        std_dev,
        volatility_tier: VolatilityTier::from_std_dev(std_dev),
        positive_count: distribution.positive(),
        negative_count: distribution.negative(),
        distribution,
    })
}

/// Rank labels by occurrence count, highest first, capped at `limit`.
///
/// Ties are broken by the most recent occurrence: among labels with equal
/// counts, the one seen last in the input ranks higher.
pub fn rank_labels<'a, I>(labels: I, limit: usize) -> Vec<RankedLabel>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stats: HashMap<&str, (u32, usize)> = HashMap::new();
    for (position, label) in labels.into_iter().enumerate() {
        let entry = stats.entry(label).or_insert((0, position));
        entry.0 += 1;
        entry.1 = position;
    }

    let mut ranked: Vec<(&str, u32, usize)> = stats
        .into_iter()
        .map(|(label, (count, last_seen))| (label, count, last_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(label, count, _)| RankedLabel {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// Mood analysis bound to a reference time zone
#[derive(Debug, Clone, Copy)]
pub struct MoodAnalyzer {
    timezone: Tz,
    top_n: usize,
}

impl MoodAnalyzer {
    pub fn new(timezone: Tz, top_n: usize) -> Self {
        Self { timezone, top_n }
    }

    pub fn with_timezone(timezone: Tz) -> Self {
        Self::new(timezone, DEFAULT_TOP_N)
    }

    pub fn analyze(&self, journal_events: &[RawEvent]) -> Option<MoodStats> {
        analyze_mood(journal_events)
    }

    /// Most frequent reasons across all journal events
    pub fn top_reasons(&self, journal_events: &[RawEvent]) -> Vec<RankedLabel> {
        rank_labels(
            journal_events
                .iter()
                .flat_map(|e| e.reasons())
                .map(String::as_str),
            self.top_n,
        )
    }

    /// Most frequent tags across all journal events
    pub fn top_tags(&self, journal_events: &[RawEvent]) -> Vec<RankedLabel> {
        rank_labels(
            journal_events
                .iter()
                .flat_map(|e| e.tags())
                .map(String::as_str),
            self.top_n,
        )
    }

    /// Chronological mood points
    pub fn timeline(&self, journal_events: &[RawEvent]) -> Vec<MoodPoint> {
        journal_events
            .iter()
            .filter_map(|event| {
                event.mood().map(|mood| MoodPoint {
                    timestamp: event.timestamp(),
                    date: self.local_date(event.timestamp()),
                    mood,
                    score: mood.score(),
                })
            })
            .collect()
    }

    /// Mean mood per weekday, Monday first; 0 for weekdays without entries
    pub fn weekday_averages(&self, journal_events: &[RawEvent]) -> Vec<WeekdayMood> {
        let mut sums = [(0u32, 0u32); 7];
        for event in journal_events {
            if let Some(score) = event.mood_score() {
                let index = self
                    .local_date(event.timestamp())
                    .weekday()
                    .num_days_from_monday() as usize;
                sums[index].0 += score as u32;
                sums[index].1 += 1;
            }
        }

        let mut day = Weekday::Mon;
        sums.iter()
            .map(|(sum, count)| {
                let point = WeekdayMood {
                    day_label: day.to_string(),
                    entry_count: *count,
                    average: if *count > 0 {
                        *sum as f64 / *count as f64
                    } else {
                        0.0
                    },
                };
                day = day.succ();
                point
            })
            .collect()
    }

    /// Good/bad day tally over the seven days ending at `now`.
    ///
    /// Each day's entries are averaged; above neutral is a good day, below is
    /// a bad day. Returns `None` when no entry falls inside the window.
    pub fn evaluate_week(
        &self,
        journal_events: &[RawEvent],
        now: DateTime<Utc>,
    ) -> Option<WeeklyEvaluation> {
        let window_start = self.evaluation_start(now)?;

        let in_window: Vec<&RawEvent> = journal_events
            .iter()
            .filter(|e| e.mood().is_some())
            .filter(|e| e.timestamp() >= window_start && e.timestamp() <= now)
            .collect();
        if in_window.is_empty() {
            return None;
        }

        let mut by_day: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
        for event in &in_window {
            let entry = by_day.entry(self.local_date(event.timestamp())).or_default();
            entry.0 += event.mood_score().map(u32::from).unwrap_or(0);
            entry.1 += 1;
        }

        let mut good_days = 0;
        let mut bad_days = 0;
        for (sum, count) in by_day.values() {
            let average = *sum as f64 / *count as f64;
            if average > NEUTRAL_SCORE {
                good_days += 1;
            } else if average < NEUTRAL_SCORE {
                bad_days += 1;
            }
        }

        let top_reason = rank_labels(
            in_window
                .iter()
                .flat_map(|e| e.reasons())
                .map(String::as_str),
            1,
        )
        .into_iter()
        .next()
        .map(|r| r.label);

        Some(WeeklyEvaluation {
            good_days,
            bad_days,
            top_reason,
        })
    }

    /// Local midnight six days before `now`; `evaluate_week` reads `[start, now]`
    pub fn evaluation_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = self.local_date(now);
        Some(start_of_day(self.timezone, today.checked_sub_days(Days::new(6))?))
    }

    fn local_date(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.timezone).date_naive()
    }
}
