//! Property-based tests for the interval model, classifier and slot generator.
//!
//! These hold for *any* valid input, not just the hand-picked scenarios in
//! the other test files.

use chrono::NaiveDate;
use proptest::prelude::*;
use schedule_engine::{
    classify, gap_minutes, generate_slots, overlaps, AppointmentStatus, BookedAppointment,
    ClassifierRules, ConflictKind, Interval, ProviderDaySchedule,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn arb_interval() -> impl Strategy<Value = Interval> {
    (0i32..1440)
        .prop_flat_map(|start| (Just(start), (start + 1)..=1440))
        .prop_map(|(start, end)| Interval::new(day(), start, end).unwrap())
}

fn arb_status() -> impl Strategy<Value = AppointmentStatus> {
    prop_oneof![
        Just(AppointmentStatus::Confirmed),
        Just(AppointmentStatus::Pending),
        Just(AppointmentStatus::Cancelled),
        Just(AppointmentStatus::Completed),
        Just(AppointmentStatus::NoShow),
    ]
}

fn arb_existing() -> impl Strategy<Value = Vec<BookedAppointment>> {
    prop::collection::vec((arb_interval(), arb_status()), 0..12).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (interval, status))| {
                BookedAppointment::new(format!("appt-{}", i), "dr-lee", interval, status)
            })
            .collect()
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Interval properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn overlap_is_symmetric(a in arb_interval(), b in arb_interval()) {
        prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
        prop_assert_eq!(gap_minutes(&a, &b), gap_minutes(&b, &a));
    }

    #[test]
    fn touching_intervals_neither_overlap_nor_gap(
        start in 0i32..1438,
        len_a in 1i32..60,
        len_b in 1i32..60,
    ) {
        let mid = (start + len_a).min(1439);
        let a = Interval::new(day(), start, mid).unwrap();
        let b = Interval::new(day(), mid, (mid + len_b).min(1440)).unwrap();

        prop_assert!(!overlaps(&a, &b));
        prop_assert_eq!(gap_minutes(&a, &b), 0);
    }

    #[test]
    fn gap_is_never_negative_and_zero_when_overlapping(a in arb_interval(), b in arb_interval()) {
        let gap = gap_minutes(&a, &b);
        prop_assert!(gap >= 0);
        if overlaps(&a, &b) {
            prop_assert_eq!(gap, 0);
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn at_most_one_conflict_per_existing_booking(
        candidate in arb_interval(),
        existing in arb_existing(),
    ) {
        let conflicts = classify(&candidate, &existing, &ClassifierRules::default());
        let mut ids: Vec<&str> = conflicts.iter().map(|c| c.with_appointment_id.as_str()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }

    #[test]
    fn overlap_conflicts_match_overlap_primitive(
        candidate in arb_interval(),
        existing in arb_existing(),
    ) {
        let conflicts = classify(&candidate, &existing, &ClassifierRules::default());
        for appt in &existing {
            let reported = conflicts
                .iter()
                .find(|c| c.with_appointment_id == appt.id);
            let expect_overlap = appt.is_active() && overlaps(&candidate, &appt.interval);
            let got_overlap = reported.map(|c| c.kind == ConflictKind::Overlap).unwrap_or(false);
            prop_assert_eq!(expect_overlap, got_overlap);
        }
    }

    #[test]
    fn output_is_sorted_and_independent_of_input_order(
        candidate in arb_interval(),
        existing in arb_existing(),
    ) {
        let rules = ClassifierRules::default();
        let forward = classify(&candidate, &existing, &rules);

        let mut reversed_input = existing.clone();
        reversed_input.reverse();
        let backward = classify(&candidate, &reversed_input, &rules);

        prop_assert_eq!(&forward, &backward);
        prop_assert!(forward.windows(2).all(|w| w[0].severity >= w[1].severity));
    }
}

// ---------------------------------------------------------------------------
// Slot generator properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn bookable_slots_never_overlap_active_bookings(
        window in arb_interval(),
        existing in arb_existing(),
        duration in 5i32..120,
        granularity in 5i32..60,
    ) {
        let schedule = ProviderDaySchedule::new("dr-lee", day(), vec![window]).unwrap();
        let slots = generate_slots(&schedule, &existing, duration, granularity).unwrap();

        for slot in slots.iter().filter(|s| s.bookable) {
            for appt in existing.iter().filter(|a| a.is_active()) {
                prop_assert!(
                    !overlaps(&slot.interval, &appt.interval),
                    "bookable slot {:?} overlaps {:?}",
                    slot.interval,
                    appt.interval
                );
            }
        }
    }

    #[test]
    fn slot_generation_is_idempotent_and_chronological(
        window in arb_interval(),
        existing in arb_existing(),
        duration in 5i32..120,
        granularity in 5i32..60,
    ) {
        let schedule = ProviderDaySchedule::new("dr-lee", day(), vec![window]).unwrap();
        let first = generate_slots(&schedule, &existing, duration, granularity).unwrap();
        let second = generate_slots(&schedule, &existing, duration, granularity).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert!(first
            .windows(2)
            .all(|w| w[0].interval.start_minute() < w[1].interval.start_minute()));
        prop_assert!(first.iter().all(|s| window.contains(&s.interval)));
    }
}
