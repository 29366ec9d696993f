//! Classify how a candidate interval collides with a provider's existing bookings.
//!
//! Each active booking on the candidate's date yields at most one [`Conflict`]:
//!
//! | relationship                        | kind             | severity |
//! |-------------------------------------|------------------|----------|
//! | intervals overlap                   | `Overlap`        | `High`   |
//! | touching, back-to-back disallowed   | `BackToBack`     | `Medium` |
//! | `0 < gap < min_buffer_minutes`      | `BufferViolation`| `Low`    |
//!
//! Output is sorted by severity (high first), then by the existing booking's
//! start time, independent of input order.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::appointment::BookedAppointment;
use crate::interval::Interval;

/// What kind of collision a pair of intervals represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Overlap,
    BackToBack,
    BufferViolation,
}

impl ConflictKind {
    /// The fixed severity attached to each kind.
    pub fn severity(self) -> Severity {
        match self {
            ConflictKind::Overlap => Severity::High,
            ConflictKind::BackToBack => Severity::Medium,
            ConflictKind::BufferViolation => Severity::Low,
        }
    }
}

/// Conflict severity. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A detected collision between a candidate and one existing booking.
///
/// Always recomputed from current data; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub with_appointment_id: String,
    pub kind: ConflictKind,
    pub severity: Severity,
    pub gap_minutes: i32,
}

/// Tunables for [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    /// Report touching bookings as `BackToBack`.
    pub back_to_back_is_conflict: bool,
    /// Gaps strictly below this many minutes are `BufferViolation`s.
    pub min_buffer_minutes: i32,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            back_to_back_is_conflict: true,
            min_buffer_minutes: 15,
        }
    }
}

impl ClassifierRules {
    /// Rules under which only true overlaps are reported.
    ///
    /// Used to decide whether a slot can be shown as bookable.
    pub fn overlap_only() -> Self {
        Self {
            back_to_back_is_conflict: false,
            min_buffer_minutes: 0,
        }
    }
}

/// Classify `candidate` against every active booking on the same date.
///
/// Cancelled, completed and no-show bookings are ignored, as are bookings on a
/// different date. An empty `existing` slice yields an empty result.
pub fn classify(
    candidate: &Interval,
    existing: &[BookedAppointment],
    rules: &ClassifierRules,
) -> Vec<Conflict> {
    let mut found: Vec<(i32, Conflict)> = existing
        .iter()
        .filter(|appt| appt.is_active() && appt.interval.date() == candidate.date())
        .filter_map(|appt| {
            classify_pair(candidate, &appt.interval, rules).map(|(kind, gap_minutes)| {
                (
                    appt.interval.start_minute(),
                    Conflict {
                        with_appointment_id: appt.id.clone(),
                        kind,
                        severity: kind.severity(),
                        gap_minutes,
                    },
                )
            })
        })
        .collect();

    // Appointment id is the last key so equal-start bookings order the same
    // way regardless of input order.
    found.sort_by(|(a_start, a), (b_start, b)| {
        (Reverse(a.severity), a_start, &a.with_appointment_id).cmp(&(
            Reverse(b.severity),
            b_start,
            &b.with_appointment_id,
        ))
    });

    trace!(
        date = %candidate.date(),
        start = candidate.start_minute(),
        end = candidate.end_minute(),
        conflicts = found.len(),
        "classified candidate"
    );

    found.into_iter().map(|(_, conflict)| conflict).collect()
}

/// Classify a single pair. The three outcomes are mutually exclusive.
fn classify_pair(
    candidate: &Interval,
    existing: &Interval,
    rules: &ClassifierRules,
) -> Option<(ConflictKind, i32)> {
    if candidate.overlaps(existing) {
        return Some((ConflictKind::Overlap, 0));
    }

    let gap = candidate.gap_minutes(existing);
    if gap == 0 && rules.back_to_back_is_conflict {
        Some((ConflictKind::BackToBack, 0))
    } else if gap > 0 && gap < rules.min_buffer_minutes {
        Some((ConflictKind::BufferViolation, gap))
    } else {
        None
    }
}

/// True iff any conflict in `conflicts` is a hard overlap.
pub fn has_overlap(conflicts: &[Conflict]) -> bool {
    conflicts.iter().any(|c| c.kind == ConflictKind::Overlap)
}
