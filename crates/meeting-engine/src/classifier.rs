//! Classify one candidate day and pick a resolution action for it.
//!
//! Classification is anchored on the organizer's earliest feasible slot:
//!
//! | Situation at the anchor slot               | Classification     |
//! |--------------------------------------------|--------------------|
//! | every participant is free                  | `AllAvailable`     |
//! | some participants are busy                 | `PartialConflict`  |
//! | the organizer has no feasible slot at all  | `AllBusy`          |
//!
//! The request's importance is an opaque input here.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::availability::Aggregator;
use crate::interval::Interval;
use crate::model::{Importance, MeetingRequest, ParticipantId};
use crate::slot::find_slot;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    AllAvailable {
        slot: Interval,
    },
    PartialConflict {
        anchor: Interval,
        conflicting: BTreeSet<ParticipantId>,
    },
    AllBusy,
}

/// Resolution chosen for a single day.
#[derive(Debug, Clone, PartialEq)]
pub enum DayResolution {
    ScheduleAll {
        slot: Interval,
        reason: String,
    },
    SchedulePartial {
        slot: Interval,
        included: BTreeSet<ParticipantId>,
        excluded: BTreeSet<ParticipantId>,
        reason: String,
    },
    RescheduleNextDay {
        reason: String,
    },
}

pub fn classify(aggregator: &Aggregator<'_>, date: NaiveDate, request: &MeetingRequest) -> Classification {
    let organizer: BTreeSet<ParticipantId> = [request.organizer_id.clone()].into();
    let Some(anchor) = find_slot(aggregator, date, request.duration_minutes, &organizer) else {
        return Classification::AllBusy;
    };

    let conflicting = busy_at(aggregator, request.participant_ids.iter(), &anchor);
    if conflicting.is_empty() {
        Classification::AllAvailable { slot: anchor }
    } else {
        Classification::PartialConflict { anchor, conflicting }
    }
}

/// Apply the resolution policy to a day's classification.
///
/// Rules, highest priority first:
/// 1. `AllAvailable` schedules everyone at the anchor slot.
/// 2. `PartialConflict` on an urgent request books the earliest slot of the
///    mandatory participants and drops the non-critical participants busy then.
/// 3. `PartialConflict` on any other request proceeds at the anchor slot when
///    every conflicting participant is non-critical.
/// 4. Anything else reschedules to the next day.
pub fn resolve_day(
    aggregator: &Aggregator<'_>,
    date: NaiveDate,
    request: &MeetingRequest,
    classification: &Classification,
) -> DayResolution {
    let availability = aggregator.availability();
    match classification {
        Classification::AllAvailable { slot } => DayResolution::ScheduleAll {
            slot: *slot,
            reason: "All participants are available at the requested time".to_string(),
        },
        Classification::PartialConflict { .. } if request.importance == Importance::Urgent => {
            let mandatory = request.mandatory_participants(availability);
            let Some(slot) = find_slot(aggregator, date, request.duration_minutes, &mandatory) else {
                return DayResolution::RescheduleNextDay {
                    reason: format!(
                        "Critical participants {} share no free slot on {}",
                        join(&mandatory),
                        date
                    ),
                };
            };
            let excluded = busy_at(aggregator, request.participant_ids.iter(), &slot);
            if excluded.is_empty() {
                return DayResolution::ScheduleAll {
                    slot,
                    reason: "All participants are available at the earliest slot of the critical participants"
                        .to_string(),
                };
            }
            let reason = format!(
                "Urgent meeting proceeds with {}. Will arrange a separate time with {}.",
                join(&included(request, &excluded)),
                join(&excluded)
            );
            partial(request, slot, excluded, reason)
        }
        Classification::PartialConflict { anchor, conflicting } => {
            let critical: BTreeSet<ParticipantId> = conflicting
                .iter()
                .filter(|id| request.is_critical(id, availability))
                .cloned()
                .collect();
            if critical.is_empty() {
                let reason = format!(
                    "Meeting can proceed with {}. Will update {} separately.",
                    join(&included(request, conflicting)),
                    join(conflicting)
                );
                partial(request, *anchor, conflicting.clone(), reason)
            } else {
                DayResolution::RescheduleNextDay {
                    reason: format!("Critical participants {} are busy on {}", join(&critical), date),
                }
            }
        }
        Classification::AllBusy => DayResolution::RescheduleNextDay {
            reason: format!(
                "Organizer has no free {}-minute slot on {}",
                request.duration_minutes, date
            ),
        },
    }
}

fn partial(
    request: &MeetingRequest,
    slot: Interval,
    excluded: BTreeSet<ParticipantId>,
    reason: String,
) -> DayResolution {
    DayResolution::SchedulePartial {
        slot,
        included: included(request, &excluded),
        excluded,
        reason,
    }
}

fn included(request: &MeetingRequest, excluded: &BTreeSet<ParticipantId>) -> BTreeSet<ParticipantId> {
    request.participant_ids.difference(excluded).cloned().collect()
}

fn busy_at<'p>(
    aggregator: &Aggregator<'_>,
    participants: impl Iterator<Item = &'p ParticipantId>,
    slot: &Interval,
) -> BTreeSet<ParticipantId> {
    participants
        .filter(|id| !aggregator.is_free(id, slot))
        .cloned()
        .collect()
}

pub(crate) fn join(ids: &BTreeSet<ParticipantId>) -> String {
    ids.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
