//! Anchor-relative timestamps

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, TimeDelta};
use std::fmt;

/// Format git accepts for `GIT_AUTHOR_DATE`/`GIT_COMMITTER_DATE`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Hour of day that adds no offset to the anchor
pub const BASELINE_HOUR: i64 = 9;

/// Day 0 at the baseline hour. All event times are relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAnchor(NaiveDateTime);

impl TimeAnchor {
    pub fn new(start: NaiveDateTime) -> Self {
        Self(start)
    }

    /// Parse `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD HH:MM:SS`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT))
            .map(Self)
            .with_context(|| format!("Invalid anchor timestamp '{}'", s))
    }

    pub fn start(&self) -> NaiveDateTime {
        self.0
    }

    /// `anchor + day_offset days + (hour - 9) hours + minute minutes`
    pub fn resolve(&self, time: EventTime) -> Result<ResolvedTimestamp> {
        let delta = TimeDelta::try_days(i64::from(time.day_offset))
            .and_then(|d| d.checked_add(&TimeDelta::hours(i64::from(time.hour) - BASELINE_HOUR)))
            .and_then(|d| d.checked_add(&TimeDelta::minutes(i64::from(time.minute))))
            .with_context(|| format!("Offset {} out of range", time))?;

        self.0
            .checked_add_signed(delta)
            .map(ResolvedTimestamp)
            .with_context(|| format!("Offset {} overflows the calendar from {}", time, self))
    }
}

impl fmt::Display for TimeAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

/// Relative position of an event: day after the anchor plus wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventTime {
    pub day_offset: u32,
    pub hour: u8,
    pub minute: u8,
}

impl EventTime {
    pub fn new(day_offset: u32, hour: u8, minute: u8) -> Self {
        Self {
            day_offset,
            hour,
            minute,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} {:02}:{:02}", self.day_offset, self.hour, self.minute)
    }
}

/// Absolute commit time, no timezone attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedTimestamp(NaiveDateTime);

impl ResolvedTimestamp {
    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for ResolvedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> TimeAnchor {
        TimeAnchor::parse("2025-10-18T09:00:00").unwrap()
    }

    #[test]
    fn test_baseline_is_identity() {
        let ts = anchor().resolve(EventTime::new(0, 9, 0)).unwrap();
        assert_eq!(ts.to_string(), "2025-10-18 09:00:00");
        assert_eq!(ts.datetime(), anchor().start());
    }

    #[test]
    fn test_one_day_apart() {
        let a = anchor().resolve(EventTime::new(0, 9, 0)).unwrap();
        let b = anchor().resolve(EventTime::new(1, 9, 0)).unwrap();
        assert_eq!(b.datetime() - a.datetime(), TimeDelta::days(1));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let time = EventTime::new(7, 16, 45);
        assert_eq!(anchor().resolve(time).unwrap(), anchor().resolve(time).unwrap());
    }

    #[test]
    fn test_hours_before_baseline_go_backwards() {
        let ts = anchor().resolve(EventTime::new(0, 7, 15)).unwrap();
        assert_eq!(ts.to_string(), "2025-10-18 07:15:00");
    }

    #[test]
    fn test_crosses_month_boundary() {
        let ts = anchor().resolve(EventTime::new(19, 15, 30)).unwrap();
        assert_eq!(ts.to_string(), "2025-11-06 15:30:00");
    }

    #[test]
    fn test_anchor_accepts_space_separator() {
        let a = TimeAnchor::parse("2025-10-18 09:00:00").unwrap();
        assert_eq!(a, anchor());
    }

    #[test]
    fn test_anchor_rejects_garbage() {
        assert!(TimeAnchor::parse("next tuesday").is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(anchor().resolve(EventTime::new(u32::MAX, 9, 0)).is_err());
    }
}
