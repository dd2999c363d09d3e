//! Period resolution
//!
//! Maps a named period token to a concrete half-open UTC interval whose
//! boundaries are local midnights of the engine's reference time zone. The
//! current instant is always an explicit argument so results are reproducible.

use crate::config::EngineConfig;
use crate::error::ComputeError;
use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Named reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Yesterday,
    Week,
    Month,
    All,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Today,
        Period::Yesterday,
        Period::Week,
        Period::Month,
        Period::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Yesterday => "yesterday",
            Period::Week => "week",
            Period::Month => "month",
            Period::All => "all",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ComputeError;

    /// Accepts English tokens and the app's Portuguese filter labels, in any case
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_lowercase().as_str() {
            "today" | "hoje" => Ok(Period::Today),
            "yesterday" | "ontem" => Ok(Period::Yesterday),
            "week" | "semana" => Ok(Period::Week),
            "month" | "mês" | "mes" => Ok(Period::Month),
            "all" | "sempre" => Ok(Period::All),
            _ => Err(ComputeError::InvalidPeriod(token.to_string())),
        }
    }
}

/// A resolved period: `[start, end)` plus the number of day buckets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSpec {
    pub period: Period,
    /// Inclusive
    pub start: DateTime<Utc>,
    /// Exclusive
    pub end: DateTime<Utc>,
    /// Local calendar date of `start`
    pub start_date: NaiveDate,
    /// Local calendar date of `end` (exclusive)
    pub end_date: NaiveDate,
    pub day_count: u32,
    #[serde(serialize_with = "serialize_tz")]
    pub timezone: Tz,
}

impl PeriodSpec {
    /// Half-open membership test
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// Calendar day of an instant in the reference time zone
    pub fn local_date(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.timezone).date_naive()
    }

    /// Copy whose `[start, end)` also covers `[from, until)`.
    ///
    /// Only the instant bounds grow; the day fields still describe the period.
    pub fn widened(&self, from: DateTime<Utc>, until: DateTime<Utc>) -> PeriodSpec {
        PeriodSpec {
            start: self.start.min(from),
            end: self.end.max(until),
            ..self.clone()
        }
    }

    /// The `day_count` calendar days ending on the last day of the period.
    ///
    /// For bounded periods this is every day of the interval; for `All` it is
    /// the trailing normalization window.
    pub fn series_dates(&self) -> Vec<NaiveDate> {
        let count = self.day_count as u64;
        let Some(first) = self.end_date.checked_sub_days(Days::new(count)) else {
            return Vec::new();
        };
        first.iter_days().take(count as usize).collect()
    }
}

fn serialize_tz<S: Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

/// Resolves period tokens against a fixed reference time zone
#[derive(Debug, Clone, Copy)]
pub struct PeriodResolver {
    timezone: Tz,
    all_time_day_count: u32,
}

impl PeriodResolver {
    pub fn new(timezone: Tz, all_time_day_count: u32) -> Self {
        Self {
            timezone,
            all_time_day_count: all_time_day_count.max(1),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ComputeError> {
        Ok(Self::new(config.tz()?, config.all_time_day_count))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Resolve a textual period token at `now`
    pub fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<PeriodSpec, ComputeError> {
        let period = token.parse::<Period>()?;
        self.resolve_period(period, now)
    }

    /// Resolve a period at `now`
    pub fn resolve_period(
        &self,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<PeriodSpec, ComputeError> {
        let tz = self.timezone;
        let today = now.with_timezone(&tz).date_naive();

        let (start_date, end_date, day_count) = match period {
            Period::Today => (today, add_days(today, 1)?, 1),
            Period::Yesterday => (sub_days(today, 1)?, today, 1),
            Period::Week => {
                let monday = sub_days(today, today.weekday().num_days_from_monday() as u64)?;
                (monday, add_days(monday, 7)?, 7)
            }
            Period::Month => {
                let first = today.with_day(1).ok_or_else(|| out_of_range(today))?;
                let next = first
                    .checked_add_months(Months::new(1))
                    .ok_or_else(|| out_of_range(first))?;
                let days = (next - first).num_days() as u32;
                (first, next, days)
            }
            Period::All => {
                let epoch_date = DateTime::<Utc>::UNIX_EPOCH.with_timezone(&tz).date_naive();
                (epoch_date, add_days(today, 1)?, self.all_time_day_count)
            }
        };

        let start = match period {
            Period::All => DateTime::<Utc>::UNIX_EPOCH,
            _ => start_of_day(tz, start_date),
        };

        Ok(PeriodSpec {
            period,
            start,
            end: start_of_day(tz, end_date),
            start_date,
            end_date,
            day_count,
            timezone: tz,
        })
    }
}

/// First instant of a local calendar day.
///
/// Zones that switch DST at midnight skip 00:00; the first existing local
/// time of the day is used instead.
pub fn start_of_day(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    let mut candidate = midnight;
    for _ in 0..(24 * 4) {
        if let Some(local) = tz.from_local_datetime(&candidate).earliest() {
            return local.with_timezone(&Utc);
        }
        candidate += Duration::minutes(15);
    }
    Utc.from_utc_datetime(&midnight)
}

/// Short English weekday label ("Mon" .. "Sun")
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, ComputeError> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| out_of_range(date))
}

fn sub_days(date: NaiveDate, days: u64) -> Result<NaiveDate, ComputeError> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| out_of_range(date))
}

fn out_of_range(date: NaiveDate) -> ComputeError {
    ComputeError::InvalidPeriod(format!("date out of range near {date}"))
}
