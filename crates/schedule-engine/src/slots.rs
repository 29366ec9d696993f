//! Enumerate candidate appointment slots on a grid over a provider's working day.
//!
//! Bookability uses overlap-only rules: a slot that merely touches or crowds
//! an existing booking is still offered, with the softer conflicts attached
//! as [`TimeSlot::soft_warnings`] for display.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::appointment::{BookedAppointment, ProviderDaySchedule};
use crate::conflict::{self, ClassifierRules, Conflict, ConflictKind};
use crate::error::{Result, ScheduleError};
use crate::interval::Interval;

/// A candidate slot and whether it can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub interval: Interval,
    pub bookable: bool,
    /// Back-to-back and buffer conflicts under the full rule set. Never affects `bookable`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub soft_warnings: Vec<Conflict>,
}

/// Generate slots with the default warning rules (see [`ClassifierRules::default`]).
///
/// # Errors
/// Returns `ScheduleError::InvalidRequest` if `duration_minutes` or
/// `granularity_minutes` is not positive.
pub fn generate_slots(
    schedule: &ProviderDaySchedule,
    existing: &[BookedAppointment],
    duration_minutes: i32,
    granularity_minutes: i32,
) -> Result<Vec<TimeSlot>> {
    generate_slots_with_rules(
        schedule,
        existing,
        duration_minutes,
        granularity_minutes,
        &ClassifierRules::default(),
    )
}

/// Generate slots, attaching soft warnings computed under `warning_rules`.
///
/// For each working window (ascending), walks a grid from the window start in
/// `granularity_minutes` steps while the slot still ends inside the window.
/// Slots never span two windows. Output is chronological.
pub fn generate_slots_with_rules(
    schedule: &ProviderDaySchedule,
    existing: &[BookedAppointment],
    duration_minutes: i32,
    granularity_minutes: i32,
    warning_rules: &ClassifierRules,
) -> Result<Vec<TimeSlot>> {
    validate_request(duration_minutes, granularity_minutes)?;

    let mut slots = Vec::new();

    for window in schedule.working_windows() {
        let mut slot_start = window.start_minute();
        while let Some(slot_end) = slot_start
            .checked_add(duration_minutes)
            .filter(|end| *end <= window.end_minute())
        {
            let candidate = Interval::new(window.date(), slot_start, slot_end)?;
            slots.push(evaluate(&candidate, existing, warning_rules));
            slot_start = slot_start.saturating_add(granularity_minutes);
        }
    }

    debug!(
        provider = %schedule.provider_id,
        date = %schedule.date,
        duration_minutes,
        granularity_minutes,
        total = slots.len(),
        bookable = slots.iter().filter(|s| s.bookable).count(),
        "generated slots"
    );

    Ok(slots)
}

/// Only the slots that can be booked, in chronological order.
pub fn bookable_slots(
    schedule: &ProviderDaySchedule,
    existing: &[BookedAppointment],
    duration_minutes: i32,
    granularity_minutes: i32,
) -> Result<Vec<TimeSlot>> {
    let slots = generate_slots(schedule, existing, duration_minutes, granularity_minutes)?;
    Ok(slots.into_iter().filter(|s| s.bookable).collect())
}

/// The earliest bookable slot, if any.
///
/// Prefers a slot without soft warnings when `prefer_clean` is set, falling
/// back to the earliest bookable slot otherwise.
pub fn find_first_bookable(
    schedule: &ProviderDaySchedule,
    existing: &[BookedAppointment],
    duration_minutes: i32,
    granularity_minutes: i32,
    prefer_clean: bool,
) -> Result<Option<TimeSlot>> {
    let slots = bookable_slots(schedule, existing, duration_minutes, granularity_minutes)?;
    if prefer_clean {
        if let Some(clean) = slots.iter().find(|s| s.soft_warnings.is_empty()) {
            return Ok(Some(clean.clone()));
        }
    }
    Ok(slots.into_iter().next())
}

fn validate_request(duration_minutes: i32, granularity_minutes: i32) -> Result<()> {
    if duration_minutes <= 0 {
        return Err(ScheduleError::InvalidRequest(format!(
            "duration must be positive, got {} minutes",
            duration_minutes
        )));
    }
    if granularity_minutes <= 0 {
        return Err(ScheduleError::InvalidRequest(format!(
            "granularity must be positive, got {} minutes",
            granularity_minutes
        )));
    }
    Ok(())
}

fn evaluate(
    candidate: &Interval,
    existing: &[BookedAppointment],
    warning_rules: &ClassifierRules,
) -> TimeSlot {
    let bookable =
        conflict::classify(candidate, existing, &ClassifierRules::overlap_only()).is_empty();

    let soft_warnings = conflict::classify(candidate, existing, warning_rules)
        .into_iter()
        .filter(|c| c.kind != ConflictKind::Overlap)
        .collect();

    TimeSlot {
        interval: *candidate,
        bookable,
        soft_warnings,
    }
}
