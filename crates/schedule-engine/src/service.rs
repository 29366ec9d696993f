//! In-process facade over a persistence collaborator.
//!
//! [`SchedulingService`] loads a fresh snapshot from an [`AppointmentStore`]
//! for every call and runs the pure engine on it. [`SchedulingService::book`]
//! is the only write path: commits for the same `(provider_id, date)` are
//! serialized, and the classifier is re-run on a fresh snapshot under the
//! lock. An overlap already present when the commit starts is a hard
//! `ScheduleError::Conflict`; one that raced in since the read yields
//! `ScheduleError::Retryable` instead of a double-booking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::appointment::{BookedAppointment, ProviderDaySchedule};
use crate::config::EngineConfig;
use crate::conflict::{self, ClassifierRules, Conflict, ConflictKind};
use crate::error::{Result, ScheduleError};
use crate::interval::Interval;
use crate::score::{ScheduleScorer, ScoreReport, UtilizationScorer};
use crate::slots::{self, TimeSlot};

/// The persistence collaborator.
pub trait AppointmentStore {
    /// Bookings for the provider on `date`. Must include confirmed and pending
    /// bookings; other statuses may be returned and are ignored.
    fn load_appointments(&self, provider_id: &str, date: NaiveDate)
        -> Result<Vec<BookedAppointment>>;

    /// The provider's working hours on `date`, or `None` if none are configured.
    fn load_provider_schedule(
        &self,
        provider_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ProviderDaySchedule>>;

    /// The booking with `id`, wherever it is stored.
    fn find_appointment(&self, id: &str) -> Result<Option<BookedAppointment>>;

    /// Insert a booking, replacing any existing booking with the same id,
    /// even one stored under another provider or date.
    fn insert_appointment(&self, appointment: BookedAppointment) -> Result<()>;
}

type DayKey = (String, NaiveDate);

/// Thread-safe in-memory [`AppointmentStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    appointments: Mutex<HashMap<DayKey, Vec<BookedAppointment>>>,
    schedules: Mutex<HashMap<DayKey, ProviderDaySchedule>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_schedule(&self, schedule: ProviderDaySchedule) -> Result<()> {
        let key = (schedule.provider_id.clone(), schedule.date);
        lock_store(&self.schedules)?.insert(key, schedule);
        Ok(())
    }
}

impl AppointmentStore for InMemoryStore {
    fn load_appointments(
        &self,
        provider_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<BookedAppointment>> {
        let key = (provider_id.to_string(), date);
        Ok(lock_store(&self.appointments)?
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    fn load_provider_schedule(
        &self,
        provider_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ProviderDaySchedule>> {
        let key = (provider_id.to_string(), date);
        Ok(lock_store(&self.schedules)?.get(&key).cloned())
    }

    fn find_appointment(&self, id: &str) -> Result<Option<BookedAppointment>> {
        Ok(lock_store(&self.appointments)?
            .values()
            .flatten()
            .find(|a| a.id == id)
            .cloned())
    }

    fn insert_appointment(&self, appointment: BookedAppointment) -> Result<()> {
        let key = (appointment.provider_id.clone(), appointment.interval.date());
        let mut all = lock_store(&self.appointments)?;
        for day in all.values_mut() {
            day.retain(|a| a.id != appointment.id);
        }
        all.entry(key).or_default().push(appointment);
        Ok(())
    }
}

fn lock_store<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ScheduleError::Store("in-memory store lock poisoned".to_string()))
}

/// One commit mutex per `(provider_id, date)`.
#[derive(Debug, Default)]
struct BookingLocks {
    keys: Mutex<HashMap<DayKey, Arc<Mutex<()>>>>,
}

impl BookingLocks {
    fn for_key(&self, provider_id: &str, date: NaiveDate) -> Arc<Mutex<()>> {
        // The map only hands out `Arc`s, so a poisoned guard holds no broken state.
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(keys.entry((provider_id.to_string(), date)).or_default())
    }
}

/// Conflict checks, slot listing, scoring and serialized booking over a store.
pub struct SchedulingService<S> {
    store: S,
    config: EngineConfig,
    scorer: Box<dyn ScheduleScorer + Send + Sync>,
    locks: BookingLocks,
}

impl<S: AppointmentStore> SchedulingService<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let scorer = Box::new(UtilizationScorer::new(config.scoring));
        Self {
            store,
            config,
            scorer,
            locks: BookingLocks::default(),
        }
    }

    /// Replace the default scorer.
    pub fn with_scorer(mut self, scorer: impl ScheduleScorer + Send + Sync + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Conflicts for a new booking at `candidate`. Empty means safe to book.
    pub fn check_conflicts(
        &self,
        candidate: &Interval,
        provider_id: &str,
    ) -> Result<Vec<Conflict>> {
        self.check_conflicts_excluding(candidate, provider_id, None)
    }

    /// Conflicts for moving booking `appointment_id` to `candidate`; the booking
    /// never conflicts with its own current slot.
    pub fn check_conflicts_for_edit(
        &self,
        candidate: &Interval,
        provider_id: &str,
        appointment_id: &str,
    ) -> Result<Vec<Conflict>> {
        self.check_conflicts_excluding(candidate, provider_id, Some(appointment_id))
    }

    fn check_conflicts_excluding(
        &self,
        candidate: &Interval,
        provider_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Conflict>> {
        let existing = self.snapshot(provider_id, candidate.date(), exclude_id)?;
        let conflicts = conflict::classify(candidate, &existing, &self.config.rules);
        debug!(
            provider = provider_id,
            date = %candidate.date(),
            conflicts = conflicts.len(),
            "checked conflicts"
        );
        Ok(conflicts)
    }

    /// Slots for the provider's day. `granularity_minutes` falls back to the
    /// configured default grid when `None`.
    ///
    /// A provider with no schedule for `date` yields an empty list.
    pub fn list_available_slots(
        &self,
        provider_id: &str,
        date: NaiveDate,
        duration_minutes: i32,
        granularity_minutes: Option<i32>,
    ) -> Result<Vec<TimeSlot>> {
        let schedule = self.schedule(provider_id, date)?;
        let existing = self.store.load_appointments(provider_id, date)?;
        slots::generate_slots_with_rules(
            &schedule,
            &existing,
            duration_minutes,
            granularity_minutes.unwrap_or(self.config.default_granularity_minutes),
            &self.config.rules,
        )
    }

    /// Advisory score for the provider's day.
    pub fn get_schedule_score(&self, provider_id: &str, date: NaiveDate) -> Result<ScoreReport> {
        let schedule = self.schedule(provider_id, date)?;
        let existing = self.store.load_appointments(provider_id, date)?;
        Ok(self.scorer.score(&existing, &schedule))
    }

    /// Commit a new or edited booking.
    ///
    /// Reads a snapshot first: an overlap already visible there fails with
    /// `ScheduleError::Conflict`. Then, holding the per-day lock for the new
    /// day (and the booking's old day when it moves), re-classifies against a
    /// fresh snapshot. An overlap that appeared in between fails with
    /// `ScheduleError::Retryable`. Softer conflicts are returned alongside a
    /// successful insert. Inactive bookings (e.g. a cancellation) are written
    /// without a check.
    pub fn book(&self, appointment: BookedAppointment) -> Result<Vec<Conflict>> {
        let provider_id = appointment.provider_id.clone();
        let date = appointment.interval.date();

        if appointment.is_active() {
            let observed = self.snapshot(&provider_id, date, Some(&appointment.id))?;
            if let Some(conflicting_id) = first_overlap(&appointment.interval, &observed) {
                return Err(ScheduleError::Conflict {
                    provider_id,
                    date,
                    conflicting_id,
                });
            }
        }

        let previous_key = self
            .store
            .find_appointment(&appointment.id)?
            .map(|prev| (prev.provider_id, prev.interval.date()));

        let mut keys = vec![(provider_id.clone(), date)];
        if let Some(old) = &previous_key {
            if *old != keys[0] {
                keys.push(old.clone());
            }
        }
        // Fixed acquisition order so two moves between the same days cannot deadlock.
        keys.sort();
        let key_locks: Vec<_> = keys.iter().map(|(p, d)| self.locks.for_key(p, *d)).collect();
        let _guards: Vec<_> = key_locks
            .iter()
            .map(|l| l.lock().unwrap_or_else(PoisonError::into_inner))
            .collect();

        let current_key = self
            .store
            .find_appointment(&appointment.id)?
            .map(|prev| (prev.provider_id, prev.interval.date()));
        if current_key.is_some_and(|k| !keys.contains(&k)) {
            debug!(appointment = %appointment.id, "booking moved concurrently");
            return Err(ScheduleError::Retryable {
                provider_id,
                date,
                conflicting_id: appointment.id,
            });
        }

        if !appointment.is_active() {
            self.store.insert_appointment(appointment)?;
            return Ok(Vec::new());
        }

        let existing = self.snapshot(&provider_id, date, Some(&appointment.id))?;
        let conflicts = conflict::classify(&appointment.interval, &existing, &self.config.rules);

        if let Some(overlap) = conflicts.iter().find(|c| c.kind == ConflictKind::Overlap) {
            warn!(
                provider = %provider_id,
                %date,
                appointment = %appointment.id,
                conflicting = %overlap.with_appointment_id,
                "overlap appeared between read and commit"
            );
            return Err(ScheduleError::Retryable {
                provider_id,
                date,
                conflicting_id: overlap.with_appointment_id.clone(),
            });
        }

        self.store.insert_appointment(appointment)?;
        Ok(conflicts)
    }

    /// [`book`](Self::book), retrying once on `Retryable` against a fresh snapshot.
    ///
    /// A second race is surfaced as the non-retryable `ScheduleError::Conflict`.
    pub fn book_with_retry(&self, appointment: BookedAppointment) -> Result<Vec<Conflict>> {
        match self.book(appointment.clone()) {
            Err(e) if e.is_retryable() => {
                debug!(appointment = %appointment.id, "retrying booking after race");
                self.book(appointment).map_err(|e| match e {
                    ScheduleError::Retryable {
                        provider_id,
                        date,
                        conflicting_id,
                    } => ScheduleError::Conflict {
                        provider_id,
                        date,
                        conflicting_id,
                    },
                    other => other,
                })
            }
            other => other,
        }
    }

    fn schedule(&self, provider_id: &str, date: NaiveDate) -> Result<ProviderDaySchedule> {
        Ok(self
            .store
            .load_provider_schedule(provider_id, date)?
            .unwrap_or_else(|| ProviderDaySchedule::unavailable(provider_id, date)))
    }

    fn snapshot(
        &self,
        provider_id: &str,
        date: NaiveDate,
        exclude_id: Option<&str>,
    ) -> Result<Vec<BookedAppointment>> {
        let mut existing = self.store.load_appointments(provider_id, date)?;
        if let Some(id) = exclude_id {
            existing.retain(|a| a.id != id);
        }
        Ok(existing)
    }
}

fn first_overlap(candidate: &Interval, existing: &[BookedAppointment]) -> Option<String> {
    conflict::classify(candidate, existing, &ClassifierRules::overlap_only())
        .into_iter()
        .next()
        .map(|c| c.with_appointment_id)
}
