//! Earliest-slot search over aggregated availability.
//!
//! The earliest-starting feasible free interval wins, and the slot begins at
//! its start. No centering or packing is attempted, so repeated calls with the
//! same inputs always return the same slot.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::availability::Aggregator;
use crate::interval::Interval;
use crate::model::ParticipantId;

/// Find the earliest slot of exactly `duration_minutes` on `date` during which
/// every participant in `subset` is free.
pub fn find_slot(
    aggregator: &Aggregator<'_>,
    date: NaiveDate,
    duration_minutes: i64,
    subset: &BTreeSet<ParticipantId>,
) -> Option<Interval> {
    first_fit(aggregator.common_free(date, subset, duration_minutes), duration_minutes)
}

/// Same as [`find_slot`], restricted to slots starting at or after `not_before`.
pub fn find_slot_after(
    aggregator: &Aggregator<'_>,
    date: NaiveDate,
    duration_minutes: i64,
    subset: &BTreeSet<ParticipantId>,
    not_before: DateTime<Utc>,
) -> Option<Interval> {
    first_fit(
        aggregator.common_free_after(date, subset, duration_minutes, Some(not_before)),
        duration_minutes,
    )
}

fn first_fit(free: Vec<Interval>, duration_minutes: i64) -> Option<Interval> {
    free.into_iter()
        .find(|slot| slot.duration_minutes() >= duration_minutes)
        .and_then(|slot| Interval::starting_at(slot.start(), duration_minutes).ok())
}
