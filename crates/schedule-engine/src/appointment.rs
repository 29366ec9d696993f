//! Read-only snapshots of bookings and provider working hours.
//!
//! Both types are owned by the persistence collaborator; the engine only reads
//! them for the duration of a single computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::interval::Interval;

/// Lifecycle status of a booked appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Confirmed,
    Pending,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    /// Only confirmed and pending bookings occupy the provider's time.
    /// Everything else is inert history.
    pub fn is_active(self) -> bool {
        matches!(self, AppointmentStatus::Confirmed | AppointmentStatus::Pending)
    }
}

/// An existing booking for a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedAppointment {
    pub id: String,
    pub provider_id: String,
    pub interval: Interval,
    pub status: AppointmentStatus,
}

impl BookedAppointment {
    pub fn new(
        id: impl Into<String>,
        provider_id: impl Into<String>,
        interval: Interval,
        status: AppointmentStatus,
    ) -> Self {
        Self {
            id: id.into(),
            provider_id: provider_id.into(),
            interval,
            status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// A provider's working windows on one date.
///
/// Windows are sorted by start and pairwise disjoint. An empty list means the
/// provider is unavailable that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule")]
pub struct ProviderDaySchedule {
    pub provider_id: String,
    pub date: NaiveDate,
    working_windows: Vec<Interval>,
}

#[derive(Deserialize)]
struct RawSchedule {
    provider_id: String,
    date: NaiveDate,
    #[serde(default)]
    working_windows: Vec<Interval>,
}

impl TryFrom<RawSchedule> for ProviderDaySchedule {
    type Error = ScheduleError;

    fn try_from(raw: RawSchedule) -> Result<Self> {
        ProviderDaySchedule::new(raw.provider_id, raw.date, raw.working_windows)
    }
}

impl ProviderDaySchedule {
    /// Build a schedule, sorting `working_windows` by start time.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRequest` if a window is dated differently
    /// from `date` or two windows overlap.
    pub fn new(
        provider_id: impl Into<String>,
        date: NaiveDate,
        mut working_windows: Vec<Interval>,
    ) -> Result<Self> {
        if let Some(stray) = working_windows.iter().find(|w| w.date() != date) {
            return Err(ScheduleError::InvalidRequest(format!(
                "working window on {} does not belong to schedule date {}",
                stray.date(),
                date
            )));
        }

        working_windows.sort_by_key(|w| (w.start_minute(), w.end_minute()));

        for pair in working_windows.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(ScheduleError::InvalidRequest(format!(
                    "working windows {}-{} and {}-{} overlap",
                    pair[0].start_time().format("%H:%M"),
                    pair[0].end_time().format("%H:%M"),
                    pair[1].start_time().format("%H:%M"),
                    pair[1].end_time().format("%H:%M"),
                )));
            }
        }

        Ok(Self {
            provider_id: provider_id.into(),
            date,
            working_windows,
        })
    }

    /// A schedule with no working windows: the provider takes no bookings on `date`.
    pub fn unavailable(provider_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            provider_id: provider_id.into(),
            date,
            working_windows: Vec::new(),
        }
    }

    /// Working windows in ascending start order.
    pub fn working_windows(&self) -> &[Interval] {
        &self.working_windows
    }

    pub fn is_unavailable(&self) -> bool {
        self.working_windows.is_empty()
    }

    /// Total schedulable minutes across all windows.
    pub fn working_minutes(&self) -> i32 {
        self.working_windows.iter().map(Interval::duration_minutes).sum()
    }

    /// True iff `interval` fits entirely inside one working window.
    pub fn covers(&self, interval: &Interval) -> bool {
        self.working_windows.iter().any(|w| w.contains(interval))
    }
}
