//! Half-open minute intervals within a single calendar date.
//!
//! An [`Interval`] is `[start_minute, end_minute)` on one `date`. Touching
//! intervals (`a.end == b.start`) do not overlap and have a gap of zero.
//! Spans crossing midnight are not representable; callers split them into
//! one interval per day.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Number of minutes in a calendar day; the exclusive upper bound of `end_minute`.
pub const MINUTES_PER_DAY: i32 = 1440;

/// A validated `[start_minute, end_minute)` span on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    date: NaiveDate,
    start_minute: i32,
    end_minute: i32,
}

#[derive(Deserialize)]
struct RawInterval {
    date: NaiveDate,
    start_minute: i32,
    end_minute: i32,
}

impl TryFrom<RawInterval> for Interval {
    type Error = ScheduleError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Interval::new(raw.date, raw.start_minute, raw.end_minute)
    }
}

impl Interval {
    /// Build an interval from minute offsets since local midnight.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidInterval` if `start < 0`, `start >= end`,
    /// or `end > 1440`.
    pub fn new(date: NaiveDate, start_minute: i32, end_minute: i32) -> Result<Self> {
        if start_minute < 0 || start_minute >= end_minute || end_minute > MINUTES_PER_DAY {
            return Err(ScheduleError::InvalidInterval {
                start: start_minute,
                end: end_minute,
            });
        }
        Ok(Self {
            date,
            start_minute,
            end_minute,
        })
    }

    /// Build an interval from a wall-clock start time and a duration in minutes.
    ///
    /// Seconds are truncated. A duration that would run past midnight fails
    /// with `InvalidInterval`.
    pub fn from_time(date: NaiveDate, start: NaiveTime, duration_minutes: i32) -> Result<Self> {
        let start_minute = (start.hour() * 60 + start.minute()) as i32;
        Self::new(date, start_minute, start_minute.saturating_add(duration_minutes))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_minute(&self) -> i32 {
        self.start_minute
    }

    pub fn end_minute(&self) -> i32 {
        self.end_minute
    }

    pub fn duration_minutes(&self) -> i32 {
        self.end_minute - self.start_minute
    }

    /// Wall-clock start time.
    pub fn start_time(&self) -> NaiveTime {
        minute_to_time(self.start_minute)
    }

    /// Wall-clock end time. An interval ending at midnight reports `00:00`.
    pub fn end_time(&self) -> NaiveTime {
        minute_to_time(self.end_minute % MINUTES_PER_DAY)
    }

    /// True iff `self` lies entirely inside `other` on the same date.
    pub fn contains(&self, other: &Interval) -> bool {
        self.date == other.date
            && self.start_minute <= other.start_minute
            && other.end_minute <= self.end_minute
    }

    /// See [`overlaps`].
    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self, other)
    }

    /// See [`gap_minutes`].
    pub fn gap_minutes(&self, other: &Interval) -> i32 {
        gap_minutes(self, other)
    }
}

/// Two intervals overlap iff they share a date and `a.start < b.end && b.start < a.end`.
///
/// Touching endpoints (`a.end == b.start`) are NOT an overlap.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.date == b.date && a.start_minute < b.end_minute && b.start_minute < a.end_minute
}

/// Distance in minutes between the closer pair of endpoints.
///
/// Overlapping intervals report `0`; negative gaps are never returned. Only
/// meaningful for intervals on the same date (minutes are compared as-is).
pub fn gap_minutes(a: &Interval, b: &Interval) -> i32 {
    let gap = a.start_minute.max(b.start_minute) - a.end_minute.min(b.end_minute);
    gap.max(0)
}

/// Callers pass `0..1440`, which `Interval::new` guarantees; midnight is the
/// fallback for anything else.
fn minute_to_time(minute: i32) -> NaiveTime {
    debug_assert!(
        (0..MINUTES_PER_DAY).contains(&minute),
        "minute {} outside a day",
        minute
    );
    NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}
