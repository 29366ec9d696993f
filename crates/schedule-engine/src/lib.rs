//! # schedule-engine
//!
//! Deterministic appointment scheduling primitives for provider calendars.
//!
//! The engine decides whether a candidate appointment collides with a
//! provider's existing bookings, and which grid slots of a working day can be
//! offered for booking. Everything is a pure function of a read-only snapshot;
//! persistence is a collaborator behind [`AppointmentStore`].
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use schedule_engine::{
//!     classify, AppointmentStatus, BookedAppointment, ClassifierRules, ConflictKind, Interval,
//! };
//!
//! let day = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
//! let existing = vec![BookedAppointment::new(
//!     "appt-1",
//!     "dr-lee",
//!     Interval::new(day, 9 * 60, 10 * 60).unwrap(),
//!     AppointmentStatus::Confirmed,
//! )];
//!
//! // 10:00 for 30 minutes touches the 09:00-10:00 booking.
//! let candidate = Interval::new(day, 10 * 60, 10 * 60 + 30).unwrap();
//! let conflicts = classify(&candidate, &existing, &ClassifierRules::default());
//! assert_eq!(conflicts.len(), 1);
//! assert_eq!(conflicts[0].kind, ConflictKind::BackToBack);
//! ```
//!
//! ## Modules
//!
//! - [`interval`] — half-open minute intervals and overlap/gap primitives
//! - [`appointment`] — booking and working-hours snapshots
//! - [`conflict`] — classify a candidate against existing bookings
//! - [`slots`] — enumerate bookable slots on a grid
//! - [`score`] — advisory utilization scoring (pluggable)
//! - [`service`] — store seam, serialized booking commits
//! - [`config`] — JSON engine configuration
//! - [`error`] — Error types

pub mod appointment;
pub mod config;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod score;
pub mod service;
pub mod slots;

pub use appointment::{AppointmentStatus, BookedAppointment, ProviderDaySchedule};
pub use config::EngineConfig;
pub use conflict::{classify, ClassifierRules, Conflict, ConflictKind, Severity};
pub use error::ScheduleError;
pub use interval::{gap_minutes, overlaps, Interval, MINUTES_PER_DAY};
pub use score::{score, ScheduleScorer, ScoreReport, ScoringThresholds, UtilizationScorer};
pub use service::{AppointmentStore, InMemoryStore, SchedulingService};
pub use slots::{bookable_slots, find_first_bookable, generate_slots, TimeSlot};
