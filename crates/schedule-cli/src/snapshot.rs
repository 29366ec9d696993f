//! One-day JSON snapshot of a provider's working hours and bookings.
//!
//! ```json
//! {
//!   "provider_id": "dr-lee",
//!   "date": "2026-03-16",
//!   "working_hours": [{ "start": "08:00", "end": "17:00" }],
//!   "appointments": [
//!     { "id": "a1", "start": "12:00", "duration_minutes": 60, "status": "confirmed" }
//!   ]
//! }
//! ```
//!
//! Times are local `HH:MM`; `24:00` closes a window at midnight.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, Timelike};
use schedule_engine::{
    AppointmentStatus, AppointmentStore, BookedAppointment, InMemoryStore, Interval,
    ProviderDaySchedule, MINUTES_PER_DAY,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DaySnapshot {
    pub provider_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub working_hours: Vec<WindowInput>,
    #[serde(default)]
    pub appointments: Vec<AppointmentInput>,
}

#[derive(Debug, Deserialize)]
pub struct WindowInput {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentInput {
    pub id: String,
    pub start: String,
    pub duration_minutes: i32,
    #[serde(default = "default_status")]
    pub status: AppointmentStatus,
}

fn default_status() -> AppointmentStatus {
    AppointmentStatus::Confirmed
}

impl DaySnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse day snapshot JSON")
    }

    /// Load the snapshot into a fresh in-memory store.
    pub fn into_store(self) -> Result<InMemoryStore> {
        let windows = self
            .working_hours
            .iter()
            .map(|w| {
                let (start, end) = (parse_minute(&w.start)?, parse_minute(&w.end)?);
                Interval::new(self.date, start, end)
                    .with_context(|| format!("Invalid working window {}-{}", w.start, w.end))
            })
            .collect::<Result<Vec<_>>>()?;

        let store = InMemoryStore::new();
        store.put_schedule(ProviderDaySchedule::new(
            self.provider_id.clone(),
            self.date,
            windows,
        )?)?;

        for appt in self.appointments {
            let start = parse_time(&appt.start)?;
            let interval = Interval::from_time(self.date, start, appt.duration_minutes)
                .with_context(|| format!("Invalid appointment '{}'", appt.id))?;
            store.insert_appointment(BookedAppointment::new(
                appt.id,
                self.provider_id.clone(),
                interval,
                appt.status,
            ))?;
        }

        Ok(store)
    }
}

/// Parse `HH:MM` into a wall-clock time.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .with_context(|| format!("Invalid time '{}', expected HH:MM", s))
}

/// Parse `HH:MM` (or `24:00`) into minutes since midnight.
pub fn parse_minute(s: &str) -> Result<i32> {
    if s == "24:00" {
        return Ok(MINUTES_PER_DAY);
    }
    let t = parse_time(s)?;
    Ok((t.hour() * 60 + t.minute()) as i32)
}

/// `HH:MM` rendering of a minute offset; 1440 renders as `24:00`.
pub fn format_minute(minute: i32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Serializable view of an interval for CLI output.
#[derive(Debug, Serialize)]
pub struct IntervalOutput {
    pub start: String,
    pub end: String,
    pub duration_minutes: i32,
}

impl From<&Interval> for IntervalOutput {
    fn from(i: &Interval) -> Self {
        Self {
            start: format_minute(i.start_minute()),
            end: format_minute(i.end_minute()),
            duration_minutes: i.duration_minutes(),
        }
    }
}
