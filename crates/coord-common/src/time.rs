//! Time handling for forecast model runs.
//!
//! Runtimes are exact UTC instants; forecast offsets are integers counted in
//! a [`TimeUnit`] from their runtime.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A (run, forecast offset) pair.
///
/// Ordered by run first, then by offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Time2D {
    /// Model run/reference time
    pub run: DateTime<Utc>,
    /// Forecast offset from `run`, in the collection's time unit
    pub time: i32,
}

impl Time2D {
    pub fn new(run: DateTime<Utc>, time: i32) -> Self {
        Self { run, time }
    }

    /// The instant this pair refers to.
    pub fn valid_datetime(&self, unit: TimeUnit) -> DateTime<Utc> {
        self.run + unit.duration(self.time)
    }
}

impl Ord for Time2D {
    fn cmp(&self, other: &Self) -> Ordering {
        self.run
            .cmp(&other.run)
            .then_with(|| self.time.cmp(&other.time))
    }
}

impl PartialOrd for Time2D {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Time2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.run.format("%Y-%m-%dT%H:%MZ"), self.time)
    }
}

/// Unit that forecast offsets are counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeUnit {
    Minute,
    #[default]
    Hour,
    Day,
}

impl TimeUnit {
    /// Parse from string (case-insensitive). Unknown names fall back to hours.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "minute" | "minutes" | "min" => Self::Minute,
            "day" | "days" => Self::Day,
            _ => Self::Hour,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    /// Length of one unit in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3600,
            Self::Day => 86_400,
        }
    }

    /// Duration of `count` units.
    pub fn duration(&self, count: i32) -> Duration {
        Duration::seconds(self.seconds() * count as i64)
    }

    /// Whole units from `from` to `to`, truncated toward zero.
    pub fn offset_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> i32 {
        ((to - from).num_seconds() / self.seconds()) as i32
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// UTC hour of day of a runtime, used to group runs of the same cycle.
pub fn run_hour(run: &DateTime<Utc>) -> u32 {
    run.hour()
}

/// Parse a runtime from ISO 8601 text, assuming UTC when no zone is given.
pub fn parse_runtime(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}
