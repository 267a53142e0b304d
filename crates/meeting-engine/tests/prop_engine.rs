//! Property-based tests for the interval model and the resolution engine.
//!
//! These check invariants that must hold for *any* calendar, not just the
//! scenarios in `engine_tests.rs`.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use meeting_engine::interval::{merge, overlaps, subtract};
use meeting_engine::{
    resolve, Availability, DateWindow, EngineConfig, Importance, Interval, MeetingRequest,
    Outcome, ParticipantAvailability, ResolutionAction,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap()
}

/// An interval within the week of 2026-03-16, on a 5-minute grid.
fn arb_interval() -> impl Strategy<Value = Interval> {
    (0i64..(7 * 24 * 12), 1i64..=48).prop_map(|(offset, len)| {
        let start = base() + Duration::minutes(offset * 5);
        Interval::new(start, start + Duration::minutes(len * 5)).unwrap()
    })
}

fn arb_intervals() -> impl Strategy<Value = Vec<Interval>> {
    prop::collection::vec(arb_interval(), 0..12)
}

fn arb_importance() -> impl Strategy<Value = Importance> {
    prop_oneof![
        Just(Importance::Urgent),
        Just(Importance::Normal),
        Just(Importance::Low),
    ]
}

/// Weekdays of the week of 2026-03-16 (Monday..Friday).
fn arb_weekday() -> impl Strategy<Value = NaiveDate> {
    (16u32..=20).prop_map(|d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap())
}

fn arb_duration() -> impl Strategy<Value = i64> {
    prop_oneof![Just(15i64), Just(30), Just(45), Just(60), Just(90)]
}

const PEOPLE: [&str; 4] = ["org", "p1", "p2", "p3"];

fn arb_availability() -> impl Strategy<Value = Availability> {
    (
        prop::collection::vec(arb_intervals(), PEOPLE.len()),
        prop::collection::vec(any::<bool>(), PEOPLE.len()),
    )
        .prop_map(|(busy, critical)| {
            PEOPLE
                .iter()
                .zip(busy)
                .zip(critical)
                .map(|((id, busy), critical)| {
                    let p = ParticipantAvailability::new(*id, busy);
                    (id.to_string(), if critical { p.critical() } else { p })
                })
                .collect()
        })
}

fn request(date: NaiveDate, duration: i64, importance: Importance) -> MeetingRequest {
    MeetingRequest {
        duration_minutes: duration,
        window: DateWindow::single(date),
        importance,
        organizer_id: "org".to_string(),
        participant_ids: PEOPLE.iter().map(|p| p.to_string()).collect(),
    }
}

/// Count of 5-minute ticks covered by a set of intervals.
fn covered_ticks(intervals: &[Interval]) -> BTreeSet<i64> {
    intervals
        .iter()
        .flat_map(|i| {
            let from = (i.start() - base()).num_minutes() / 5;
            let to = (i.end() - base()).num_minutes() / 5;
            from..to
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Interval properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn overlaps_is_symmetric(a in arb_interval(), b in arb_interval()) {
        prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
    }

    #[test]
    fn merge_never_grows_and_preserves_union(intervals in arb_intervals()) {
        let merged = merge(&intervals);
        prop_assert!(merged.len() <= intervals.len());
        prop_assert_eq!(covered_ticks(&merged), covered_ticks(&intervals));
        for pair in merged.windows(2) {
            prop_assert!(pair[0].end() < pair[1].start(), "merged output must be disjoint and non-adjacent");
        }
    }

    #[test]
    fn subtract_result_avoids_all_busy_time(window in arb_interval(), busy in arb_intervals()) {
        let free = subtract(&window, &busy);
        for slot in &free {
            prop_assert!(window.contains(slot));
            for b in &busy {
                prop_assert!(!slot.overlaps(b));
            }
        }
        let mut expected = covered_ticks(&[window]);
        for tick in covered_ticks(&busy) {
            expected.remove(&tick);
        }
        prop_assert_eq!(covered_ticks(&free), expected);
    }
}

// ---------------------------------------------------------------------------
// Engine properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn decision_partitions_participants(
        availability in arb_availability(),
        date in arb_weekday(),
        duration in arb_duration(),
        importance in arb_importance(),
    ) {
        let req = request(date, duration, importance);
        let decision = resolve(&req, &availability, &EngineConfig::default()).unwrap();

        let included = decision.included_participants();
        let excluded = decision.excluded_participants();
        prop_assert!(included.is_disjoint(excluded));
        let union: BTreeSet<String> = included.union(excluded).cloned().collect();
        prop_assert_eq!(&union, &req.participant_ids);

        if decision.action() == ResolutionAction::ScheduleAll {
            prop_assert!(excluded.is_empty());
        }
        if decision.outcome() == Outcome::Scheduled {
            prop_assert!(included.contains("org"));
        }
    }

    #[test]
    fn scheduled_slot_fits_business_hours_and_everyone_included_is_free(
        availability in arb_availability(),
        date in arb_weekday(),
        duration in arb_duration(),
        importance in arb_importance(),
    ) {
        let req = request(date, duration, importance);
        let decision = resolve(&req, &availability, &EngineConfig::default()).unwrap();

        if let Some(slot) = decision.scheduled_interval() {
            prop_assert_eq!(slot.duration_minutes(), duration);
            let day = slot.start().date_naive();
            prop_assert!(!meeting_engine::model::is_weekend(day));
            let open = Utc.from_utc_datetime(&day.and_hms_opt(9, 0, 0).unwrap());
            let close = Utc.from_utc_datetime(&day.and_hms_opt(18, 0, 0).unwrap());
            prop_assert!(slot.start() >= open && slot.end() <= close);

            for id in decision.included_participants() {
                if let Some(calendar) = availability.get(id) {
                    for busy in &calendar.busy_intervals {
                        prop_assert!(!busy.overlaps(&slot), "{} is busy during {:?}", id, slot);
                    }
                }
            }
        }
    }

    #[test]
    fn reschedules_are_bounded(
        availability in arb_availability(),
        date in arb_weekday(),
        duration in arb_duration(),
    ) {
        let req = request(date, duration, Importance::Normal);
        let decision = resolve(&req, &availability, &EngineConfig::default()).unwrap();
        prop_assert!(decision.evaluated_days().len() <= 8);
        if decision.outcome() == Outcome::Failed {
            prop_assert!(decision.scheduled_interval().is_none());
        }
    }

    #[test]
    fn free_calendars_always_schedule_all_at_open(
        date in arb_weekday(),
        duration in arb_duration(),
        importance in arb_importance(),
    ) {
        let req = request(date, duration, importance);
        let decision = resolve(&req, &Availability::new(), &EngineConfig::default()).unwrap();
        prop_assert_eq!(decision.action(), ResolutionAction::ScheduleAll);
        let open = Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap());
        prop_assert_eq!(decision.scheduled_interval().map(|s| s.start()), Some(open));
    }

    #[test]
    fn weekend_dates_are_always_rejected(
        availability in arb_availability(),
        day in 21u32..=22,
        importance in arb_importance(),
    ) {
        let date = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        let req = request(date, 30, importance);
        let decision = resolve(&req, &availability, &EngineConfig::default()).unwrap();
        prop_assert_eq!(decision.action(), ResolutionAction::RejectWeekend);
        prop_assert_eq!(decision.reason(), "Its weekends no meetings are possible");
    }
}
