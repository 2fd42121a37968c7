use std::{fmt::Display, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// The way a day is written into the usage file.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Converts std durations coming from configuration. Values chrono can't represent saturate.
pub fn to_chrono(duration: std::time::Duration) -> Duration {
    Duration::from_std(duration).unwrap_or(Duration::MAX)
}

/// Time zone whose midnight starts a new usage day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayBoundary {
    #[default]
    Local,
    Utc,
}

impl DayBoundary {
    /// Calendar day `moment` belongs to.
    pub fn day_of(&self, moment: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Local => moment.with_timezone(&Local).date_naive(),
            DayBoundary::Utc => moment.date_naive(),
        }
    }

    /// Instant the day containing `moment` started at.
    pub fn day_start(&self, moment: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = self.day_of(moment).and_time(NaiveTime::MIN);
        match self {
            // Midnight can be skipped by a DST jump. The day then starts at `moment`, so nothing of
            // the gap that crossed it is counted.
            DayBoundary::Local => Local
                .from_local_datetime(&midnight)
                .earliest()
                .map(|v| v.with_timezone(&Utc))
                .unwrap_or(moment),
            DayBoundary::Utc => Utc.from_utc_datetime(&midnight),
        }
    }
}

impl FromStr for DayBoundary {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(DayBoundary::Local),
            "utc" => Ok(DayBoundary::Utc),
            other => Err(anyhow!("Unknown day boundary {other}, expected local or utc")),
        }
    }
}

impl Display for DayBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayBoundary::Local => write!(f, "local"),
            DayBoundary::Utc => write!(f, "utc"),
        }
    }
}
