//! Coarse "time ago" rendering for post timestamps.

use chrono::{DateTime, TimeZone, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 604_800;
const MONTH: i64 = 2_678_400;
const YEAR: i64 = 31_536_000;

/// Relative buckets, largest first. The year bucket is handled separately
/// because it renders a calendar date instead of a phrase.
const BUCKETS: [(i64, &str); 5] = [
    (MONTH, "month"),
    (WEEK, "week"),
    (DAY, "day"),
    (HOUR, "hour"),
    (MINUTE, "minute"),
];

/// A point in time as handed over by callers: epoch seconds or a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    EpochSeconds(i64),
    Date(DateTime<Utc>),
}

impl Timestamp {
    fn epoch_seconds(&self) -> i64 {
        match self {
            Self::EpochSeconds(secs) => *secs,
            Self::Date(date) => date.timestamp(),
        }
    }

    fn to_date(self) -> Option<DateTime<Utc>> {
        match self {
            Self::EpochSeconds(secs) => Utc.timestamp_opt(secs, 0).single(),
            Self::Date(date) => Some(date),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Self::EpochSeconds(secs)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(date: DateTime<Utc>) -> Self {
        Self::Date(date)
    }
}

/// Format `ts` relative to the current time
pub fn format_timestamp(ts: impl Into<Timestamp>) -> String {
    format_timestamp_at(ts, Utc::now())
}

/// Format `ts` relative to `now`.
///
/// Anything at least a year old is rendered as its `YYYY-MM-DD` date.
/// Quotients are rounded half away from zero, so 150 seconds is "3 minutes ago".
pub fn format_timestamp_at(ts: impl Into<Timestamp>, now: DateTime<Utc>) -> String {
    let ts = ts.into();
    let elapsed = now.timestamp() - ts.epoch_seconds();

    if elapsed >= YEAR {
        if let Some(date) = ts.to_date() {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    for (threshold, unit) in BUCKETS {
        if elapsed >= threshold {
            let count = (elapsed as f64 / threshold as f64).round() as i64;
            return phrase(count, unit);
        }
    }

    "Just now".to_string()
}

fn phrase(count: i64, unit: &str) -> String {
    match (count, unit) {
        (1, "minute") => "A minute ago".to_string(),
        (1, unit) => format!("1 {} ago", unit),
        (n, unit) => format!("{} {}s ago", n, unit),
    }
}
