//! Error types for schedule-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Start/end minutes do not describe a non-empty span inside one day.
    #[error("Invalid interval: start={start} end={end} (expected 0 <= start < end <= 1440)")]
    InvalidInterval { start: i32, end: i32 },

    /// Request parameters failed validation (e.g. non-positive duration).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A new overlap appeared between the snapshot read and the commit.
    /// Callers should re-check against a fresh snapshot and retry once.
    #[error("Booking race for provider {provider_id} on {date}: now overlaps appointment {conflicting_id}")]
    Retryable {
        provider_id: String,
        date: NaiveDate,
        conflicting_id: String,
    },

    /// The candidate overlaps an existing booking that was already present
    /// before the commit started, or still present after a retry.
    #[error("Provider {provider_id} is already booked on {date}: overlaps appointment {conflicting_id}")]
    Conflict {
        provider_id: String,
        date: NaiveDate,
        conflicting_id: String,
    },

    /// The persistence collaborator failed to load or store data.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScheduleError {
    /// Whether the caller may retry the same operation against fresh data.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScheduleError::Retryable { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
