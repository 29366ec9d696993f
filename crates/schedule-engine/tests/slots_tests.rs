//! Tests for availability slot generation.

use chrono::NaiveDate;
use schedule_engine::slots::generate_slots_with_rules;
use schedule_engine::{
    bookable_slots, find_first_bookable, generate_slots, AppointmentStatus, BookedAppointment,
    ClassifierRules, ConflictKind, Interval, ProviderDaySchedule, ScheduleError,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn at(hour: i32, minute: i32) -> i32 {
    hour * 60 + minute
}

fn window(start: i32, end: i32) -> Interval {
    Interval::new(day(), start, end).unwrap()
}

fn schedule(windows: Vec<Interval>) -> ProviderDaySchedule {
    ProviderDaySchedule::new("dr-lee", day(), windows).unwrap()
}

fn booked(id: &str, start: i32, end: i32) -> BookedAppointment {
    BookedAppointment::new(
        id,
        "dr-lee",
        Interval::new(day(), start, end).unwrap(),
        AppointmentStatus::Confirmed,
    )
}

fn starts(slots: &[schedule_engine::TimeSlot]) -> Vec<i32> {
    slots.iter().map(|s| s.interval.start_minute()).collect()
}

// ── Reference scenario ──────────────────────────────────────────────────────

#[test]
fn scenario_e_lunch_booking_blocks_two_grid_points() {
    let sched = schedule(vec![window(at(8, 0), at(17, 0))]);
    let existing = vec![booked("lunch", at(12, 0), at(13, 0))];

    let slots = generate_slots(&sched, &existing, 30, 30).unwrap();

    // 08:00 .. 16:30 inclusive.
    assert_eq!(slots.len(), 18);
    assert_eq!(slots.iter().filter(|s| s.bookable).count(), 16);

    let noon = slots
        .iter()
        .find(|s| s.interval.start_minute() == at(12, 0))
        .unwrap();
    assert!(!noon.bookable);
    let half_past = slots
        .iter()
        .find(|s| s.interval.start_minute() == at(12, 30))
        .unwrap();
    assert!(!half_past.bookable);
}

#[test]
fn slots_touching_a_booking_stay_bookable_with_warning() {
    let sched = schedule(vec![window(at(8, 0), at(17, 0))]);
    let existing = vec![booked("lunch", at(12, 0), at(13, 0))];

    let slots = generate_slots(&sched, &existing, 30, 30).unwrap();

    for start in [at(11, 30), at(13, 0)] {
        let slot = slots
            .iter()
            .find(|s| s.interval.start_minute() == start)
            .unwrap();
        assert!(slot.bookable);
        assert_eq!(slot.soft_warnings.len(), 1);
        assert_eq!(slot.soft_warnings[0].kind, ConflictKind::BackToBack);
    }

    let clear = slots
        .iter()
        .find(|s| s.interval.start_minute() == at(11, 0))
        .unwrap();
    assert!(clear.soft_warnings.is_empty(), "30-minute gap needs no warning");
}

#[test]
fn buffer_warning_on_nearby_slot() {
    let sched = schedule(vec![window(at(9, 0), at(12, 0))]);
    let existing = vec![booked("a", at(9, 0), at(9, 50))];

    let slots = generate_slots(&sched, &existing, 30, 10).unwrap();
    let ten = slots
        .iter()
        .find(|s| s.interval.start_minute() == at(10, 0))
        .unwrap();

    assert!(ten.bookable);
    assert_eq!(ten.soft_warnings[0].kind, ConflictKind::BufferViolation);
    assert_eq!(ten.soft_warnings[0].gap_minutes, 10);
}

#[test]
fn custom_warning_rules_can_silence_soft_warnings() {
    let sched = schedule(vec![window(at(8, 0), at(17, 0))]);
    let existing = vec![booked("lunch", at(12, 0), at(13, 0))];

    let slots =
        generate_slots_with_rules(&sched, &existing, 30, 30, &ClassifierRules::overlap_only())
            .unwrap();

    assert!(slots.iter().all(|s| s.soft_warnings.is_empty()));
    assert_eq!(slots.iter().filter(|s| s.bookable).count(), 16);
}

// ── Windows ─────────────────────────────────────────────────────────────────

#[test]
fn slots_never_span_window_boundaries() {
    // Windows passed out of order; the schedule sorts them.
    let sched = schedule(vec![
        window(at(13, 0), at(17, 0)),
        window(at(8, 0), at(12, 0)),
    ]);

    let slots = generate_slots(&sched, &[], 45, 30).unwrap();

    assert_eq!(
        starts(&slots),
        vec![
            at(8, 0),
            at(8, 30),
            at(9, 0),
            at(9, 30),
            at(10, 0),
            at(10, 30),
            at(11, 0),
            at(13, 0),
            at(13, 30),
            at(14, 0),
            at(14, 30),
            at(15, 0),
            at(15, 30),
            at(16, 0),
        ]
    );
    assert!(slots.iter().all(|s| sched.covers(&s.interval)));
}

#[test]
fn grid_stops_when_slot_no_longer_fits() {
    let sched = schedule(vec![window(at(9, 0), at(10, 0))]);
    let slots = generate_slots(&sched, &[], 25, 20).unwrap();
    assert_eq!(starts(&slots), vec![at(9, 0), at(9, 20)]);
}

#[test]
fn slot_may_end_exactly_at_window_end() {
    let sched = schedule(vec![window(at(9, 0), at(10, 0))]);
    let slots = generate_slots(&sched, &[], 60, 15).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].interval.end_minute(), at(10, 0));
}

#[test]
fn unavailable_provider_yields_empty_list() {
    let sched = ProviderDaySchedule::unavailable("dr-lee", day());
    let slots = generate_slots(&sched, &[], 30, 15).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn duration_longer_than_every_window_yields_empty_list() {
    let sched = schedule(vec![
        window(at(8, 0), at(9, 0)),
        window(at(10, 0), at(11, 30)),
    ]);
    let slots = generate_slots(&sched, &[], 120, 15).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn overlapping_working_windows_rejected() {
    let result = ProviderDaySchedule::new(
        "dr-lee",
        day(),
        vec![window(at(8, 0), at(12, 0)), window(at(11, 0), at(14, 0))],
    );
    assert!(matches!(result, Err(ScheduleError::InvalidRequest(_))));
}

#[test]
fn window_on_another_date_rejected() {
    let stray = Interval::new(day().succ_opt().unwrap(), at(8, 0), at(12, 0)).unwrap();
    let result = ProviderDaySchedule::new("dr-lee", day(), vec![stray]);
    assert!(matches!(result, Err(ScheduleError::InvalidRequest(_))));
}

// ── Validation ──────────────────────────────────────────────────────────────

#[test]
fn non_positive_duration_rejected() {
    let sched = schedule(vec![window(at(8, 0), at(17, 0))]);
    assert!(matches!(
        generate_slots(&sched, &[], 0, 15),
        Err(ScheduleError::InvalidRequest(_))
    ));
    assert!(matches!(
        generate_slots(&sched, &[], -30, 15),
        Err(ScheduleError::InvalidRequest(_))
    ));
}

#[test]
fn non_positive_granularity_rejected() {
    let sched = schedule(vec![window(at(8, 0), at(17, 0))]);
    assert!(matches!(
        generate_slots(&sched, &[], 30, 0),
        Err(ScheduleError::InvalidRequest(_))
    ));
}

#[test]
fn invalid_request_rejected_even_without_windows() {
    let sched = ProviderDaySchedule::unavailable("dr-lee", day());
    assert!(generate_slots(&sched, &[], 30, -1).is_err());
}

#[test]
fn huge_duration_and_granularity_do_not_overflow() {
    let sched = schedule(vec![window(at(8, 0), at(17, 0))]);
    assert!(generate_slots(&sched, &[], i32::MAX, 30).unwrap().is_empty());
    assert_eq!(generate_slots(&sched, &[], 30, i32::MAX).unwrap().len(), 1);
}

// ── Status handling ─────────────────────────────────────────────────────────

#[test]
fn cancelled_booking_does_not_block_slots() {
    let sched = schedule(vec![window(at(9, 0), at(10, 0))]);
    let existing = vec![BookedAppointment::new(
        "gone",
        "dr-lee",
        Interval::new(day(), at(9, 0), at(10, 0)).unwrap(),
        AppointmentStatus::Cancelled,
    )];
    let slots = generate_slots(&sched, &existing, 30, 30).unwrap();
    assert!(slots.iter().all(|s| s.bookable));
}

// ── Conveniences ────────────────────────────────────────────────────────────

#[test]
fn bookable_slots_filters_blocked_points() {
    let sched = schedule(vec![window(at(8, 0), at(17, 0))]);
    let existing = vec![booked("lunch", at(12, 0), at(13, 0))];

    let slots = bookable_slots(&sched, &existing, 30, 30).unwrap();
    assert_eq!(slots.len(), 16);
    assert!(!starts(&slots).contains(&at(12, 0)));
}

#[test]
fn first_bookable_with_and_without_clean_preference() {
    let sched = schedule(vec![window(at(8, 0), at(17, 0))]);
    let existing = vec![booked("early", at(8, 0), at(9, 0))];

    let first = find_first_bookable(&sched, &existing, 30, 30, false)
        .unwrap()
        .unwrap();
    assert_eq!(first.interval.start_minute(), at(9, 0));
    assert!(!first.soft_warnings.is_empty());

    let clean = find_first_bookable(&sched, &existing, 30, 30, true)
        .unwrap()
        .unwrap();
    assert_eq!(clean.interval.start_minute(), at(9, 30));
}

#[test]
fn first_bookable_none_when_day_is_full() {
    let sched = schedule(vec![window(at(9, 0), at(10, 0))]);
    let existing = vec![booked("all-day", at(9, 0), at(10, 0))];
    assert!(find_first_bookable(&sched, &existing, 30, 15, true)
        .unwrap()
        .is_none());
}
