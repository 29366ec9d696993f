//! Advisory utilization and risk scoring for a provider's day.
//!
//! Scores are deterministic functions of the input and never gate a booking.
//! [`ScheduleScorer`] is the extension point; [`UtilizationScorer`] is the
//! built-in heuristic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::appointment::{BookedAppointment, ProviderDaySchedule};
use crate::conflict::{self, ClassifierRules, Severity};

/// Advisory summary of one provider day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// `100 * booked minutes / working minutes`; `0.0` when there are no working minutes.
    pub utilization_percent: f64,
    /// Idle minutes between chronologically adjacent bookings, counted only inside working windows.
    pub gap_minutes_total: i32,
    /// Number of overlapping booking pairs.
    pub conflict_count: usize,
    pub recommendations: Vec<String>,
}

/// A pluggable scorer. Implementations must not depend on anything but their inputs.
pub trait ScheduleScorer {
    fn score(
        &self,
        day_appointments: &[BookedAppointment],
        schedule: &ProviderDaySchedule,
    ) -> ScoreReport;
}

/// Thresholds that trigger [`UtilizationScorer`] recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringThresholds {
    pub low_utilization_percent: f64,
    pub high_utilization_percent: f64,
    pub idle_gap_minutes: i32,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            low_utilization_percent: 60.0,
            high_utilization_percent: 90.0,
            idle_gap_minutes: 60,
        }
    }
}

/// Utilization, idle-gap and overlap heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UtilizationScorer {
    pub thresholds: ScoringThresholds,
}

impl UtilizationScorer {
    pub fn new(thresholds: ScoringThresholds) -> Self {
        Self { thresholds }
    }
}

impl ScheduleScorer for UtilizationScorer {
    fn score(
        &self,
        day_appointments: &[BookedAppointment],
        schedule: &ProviderDaySchedule,
    ) -> ScoreReport {
        let mut active: Vec<BookedAppointment> = day_appointments
            .iter()
            .filter(|a| a.is_active() && a.interval.date() == schedule.date)
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            (a.interval.start_minute(), a.interval.end_minute(), &a.id).cmp(&(
                b.interval.start_minute(),
                b.interval.end_minute(),
                &b.id,
            ))
        });

        let booked_minutes: i32 = active.iter().map(|a| a.interval.duration_minutes()).sum();
        let working_minutes = schedule.working_minutes();
        let utilization_percent = if working_minutes > 0 {
            100.0 * f64::from(booked_minutes) / f64::from(working_minutes)
        } else {
            0.0
        };

        let gap_minutes_total = idle_gap_minutes(&active, schedule);
        let conflict_count = overlapping_pairs(&active);
        let outside_hours = active
            .iter()
            .filter(|a| !schedule.covers(&a.interval))
            .count();

        let recommendations = self.recommend(
            schedule,
            active.len(),
            utilization_percent,
            gap_minutes_total,
            conflict_count,
            outside_hours,
        );

        debug!(
            provider = %schedule.provider_id,
            date = %schedule.date,
            utilization_percent,
            gap_minutes_total,
            conflict_count,
            "scored day"
        );

        ScoreReport {
            utilization_percent,
            gap_minutes_total,
            conflict_count,
            recommendations,
        }
    }
}

impl UtilizationScorer {
    fn recommend(
        &self,
        schedule: &ProviderDaySchedule,
        active_count: usize,
        utilization_percent: f64,
        gap_minutes_total: i32,
        conflict_count: usize,
        outside_hours: usize,
    ) -> Vec<String> {
        let t = &self.thresholds;
        let mut out = Vec::new();

        if schedule.is_unavailable() {
            out.push(format!("no working hours on {}", schedule.date));
        }
        if conflict_count > 0 {
            out.push(format!(
                "{} overlapping appointment pair(s): resolve double-bookings",
                conflict_count
            ));
        }
        if outside_hours > 0 {
            out.push(format!(
                "{} appointment(s) fall outside working hours",
                outside_hours
            ));
        }
        if !schedule.is_unavailable() {
            if utilization_percent < t.low_utilization_percent {
                out.push(format!(
                    "utilization below {:.0}%: consider consolidating appointments toward the start of the day",
                    t.low_utilization_percent
                ));
            } else if utilization_percent > t.high_utilization_percent {
                out.push(format!(
                    "utilization above {:.0}%: little slack left for overruns or walk-ins",
                    t.high_utilization_percent
                ));
            }
        }
        if active_count > 1 && gap_minutes_total >= t.idle_gap_minutes && gap_minutes_total > 0 {
            out.push(format!(
                "{} idle minutes between appointments: close gaps to free a contiguous block",
                gap_minutes_total
            ));
        }

        out
    }
}

/// Score with the default [`UtilizationScorer`].
pub fn score(day_appointments: &[BookedAppointment], schedule: &ProviderDaySchedule) -> ScoreReport {
    UtilizationScorer::default().score(day_appointments, schedule)
}

/// Idle minutes between consecutive bookings, clipped to the working windows.
///
/// A gap spanning a break between windows contributes only its working
/// minutes on either side. `sorted` must be ordered by start. Overlapping
/// bookings extend the busy cursor rather than producing negative gaps.
fn idle_gap_minutes(sorted: &[BookedAppointment], schedule: &ProviderDaySchedule) -> i32 {
    let mut total = 0;
    let mut cursor: Option<i32> = None;

    for appt in sorted {
        let start = appt.interval.start_minute();
        if let Some(busy_until) = cursor {
            if start > busy_until {
                total += working_minutes_between(schedule, busy_until, start);
            }
        }
        let end = appt.interval.end_minute();
        cursor = Some(cursor.map_or(end, |c| c.max(end)));
    }

    total
}

fn working_minutes_between(schedule: &ProviderDaySchedule, from: i32, to: i32) -> i32 {
    schedule
        .working_windows()
        .iter()
        .map(|w| (to.min(w.end_minute()) - from.max(w.start_minute())).max(0))
        .sum()
}

/// Count overlapping pairs by classifying each booking against the ones after it.
fn overlapping_pairs(sorted: &[BookedAppointment]) -> usize {
    let rules = ClassifierRules::overlap_only();
    sorted
        .iter()
        .enumerate()
        .map(|(i, appt)| {
            conflict::classify(&appt.interval, &sorted[i + 1..], &rules)
                .iter()
                .filter(|c| c.severity == Severity::High)
                .count()
        })
        .sum()
}
