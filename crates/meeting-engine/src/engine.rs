//! The resolution engine: a small linear state machine over candidate days.
//!
//! ```text
//! Start ──weekend──▶ Rejected
//!   │
//!   ▼
//! EvaluatingDay ──schedule_all / schedule_partial──▶ Scheduled
//!   │        ▲
//!   │        └──────── day advanced ────────┐
//!   ▼                                       │
//! Rescheduling ─────────────────────────────┘
//!   │
//!   └──look-ahead exhausted──▶ Failed
//! ```
//!
//! `Scheduled`, `Rejected` and `Failed` are terminal. The engine performs no
//! I/O; everything it needs is passed in, so independent requests can be
//! resolved concurrently.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::availability::Aggregator;
use crate::classifier::{classify, join, resolve_day, DayResolution};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::interval::Interval;
use crate::model::{next_weekday, Availability, MeetingRequest, ParticipantId};
use crate::slot::{find_slot, find_slot_after};

/// User-facing message for weekend requests.
pub const WEEKEND_MESSAGE: &str = "Its weekends no meetings are possible";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionAction {
    ScheduleAll,
    SchedulePartial,
    RescheduleNextDay,
    RejectWeekend,
}

impl ResolutionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionAction::ScheduleAll => "schedule_all",
            ResolutionAction::SchedulePartial => "schedule_partial",
            ResolutionAction::RescheduleNextDay => "reschedule_next_day",
            ResolutionAction::RejectWeekend => "reject_weekend",
        }
    }
}

/// Terminal state the engine stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Scheduled,
    Rejected,
    Failed,
}

/// A proposed separate meeting between the organizer and excluded participants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUp {
    pub participants: BTreeSet<ParticipantId>,
    pub interval: Interval,
}

/// The engine's final answer for one request. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionDecision {
    action: ResolutionAction,
    outcome: Outcome,
    scheduled_interval: Option<Interval>,
    included_participants: BTreeSet<ParticipantId>,
    excluded_participants: BTreeSet<ParticipantId>,
    reason: String,
    evaluated_days: Vec<NaiveDate>,
    follow_up: Option<FollowUp>,
}

impl ResolutionDecision {
    pub fn action(&self) -> ResolutionAction {
        self.action
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn scheduled_interval(&self) -> Option<Interval> {
        self.scheduled_interval
    }

    pub fn included_participants(&self) -> &BTreeSet<ParticipantId> {
        &self.included_participants
    }

    pub fn excluded_participants(&self) -> &BTreeSet<ParticipantId> {
        &self.excluded_participants
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Candidate days the engine classified, in order.
    pub fn evaluated_days(&self) -> &[NaiveDate] {
        &self.evaluated_days
    }

    pub fn follow_up(&self) -> Option<&FollowUp> {
        self.follow_up.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    Start,
    EvaluatingDay(NaiveDate),
    Rescheduling { from: NaiveDate, reason: String },
    Scheduled,
    Rejected,
    Failed,
}

impl EngineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EngineState::Scheduled | EngineState::Rejected | EngineState::Failed
        )
    }
}

/// Resolves meeting requests under a fixed configuration.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: EngineConfig,
}

impl Resolver {
    /// # Errors
    /// Returns the first problem reported by [`EngineConfig::validate`].
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Resolver { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decide whether, when and with whom to hold the requested meeting.
    ///
    /// # Errors
    /// Returns an error only for malformed requests (see [`MeetingRequest::validate`]).
    /// Weekend requests and exhausted look-aheads are `Ok` decisions.
    pub fn resolve(
        &self,
        request: &MeetingRequest,
        availability: &Availability,
    ) -> Result<ResolutionDecision> {
        request.validate()?;
        let aggregator = Aggregator::new(&self.config, availability)?;
        let lookahead = self.config.lookahead_days;
        let horizon = request
            .window
            .latest_date
            .checked_add_days(Days::new(u64::from(lookahead)))
            .unwrap_or(request.window.latest_date);

        let mut state = EngineState::Start;
        let mut evaluated_days = Vec::new();
        // Days past `latest_date` count against the look-ahead; days inside
        // the window never do.
        let mut days_past_window = 0u32;

        loop {
            let next = match &state {
                EngineState::Start if request.window.touches_weekend() => {
                    info!(
                        "rejecting request from {}: window {}..{} touches a weekend",
                        request.organizer_id, request.window.earliest_date, request.window.latest_date
                    );
                    transition(&state, &EngineState::Rejected);
                    return Ok(rejected(request));
                }
                EngineState::Start => EngineState::EvaluatingDay(request.window.earliest_date),
                EngineState::EvaluatingDay(date) => {
                    let date = *date;
                    evaluated_days.push(date);
                    let classification = classify(&aggregator, date, request);
                    debug!("classified {date}: {classification:?}");

                    match resolve_day(&aggregator, date, request, &classification) {
                        DayResolution::RescheduleNextDay { reason } => {
                            EngineState::Rescheduling { from: date, reason }
                        }
                        scheduled => {
                            transition(&state, &EngineState::Scheduled);
                            let decision = scheduled_decision(
                                &aggregator,
                                request,
                                date,
                                scheduled,
                                evaluated_days.len() > 1,
                                evaluated_days,
                                horizon,
                            );
                            info!(
                                "scheduled {} on {date}: {}",
                                decision.action.as_str(),
                                decision.reason
                            );
                            return Ok(decision);
                        }
                    }
                }
                EngineState::Rescheduling { from, reason } => {
                    let latest = request.window.latest_date;
                    match next_weekday(*from) {
                        Some(day) if day <= latest => EngineState::EvaluatingDay(day),
                        Some(day) if days_past_window < lookahead && day <= horizon => {
                            days_past_window += 1;
                            EngineState::EvaluatingDay(day)
                        }
                        _ => {
                            transition(&state, &EngineState::Failed);
                            info!("no feasible day found for request from {}", request.organizer_id);
                            return Ok(failed(request, evaluated_days, reason));
                        }
                    }
                }
                EngineState::Scheduled | EngineState::Rejected | EngineState::Failed => {
                    unreachable!("terminal states return before the next iteration")
                }
            };
            transition(&state, &next);
            state = next;
        }
    }
}

/// Resolve a single request with `config`.
pub fn resolve(
    request: &MeetingRequest,
    availability: &Availability,
    config: &EngineConfig,
) -> Result<ResolutionDecision> {
    Resolver::new(config.clone())?.resolve(request, availability)
}

fn transition(from: &EngineState, to: &EngineState) {
    debug_assert!(!from.is_terminal(), "no transition leaves {from:?}");
    debug!("engine state {from:?} -> {to:?}");
}

fn rejected(request: &MeetingRequest) -> ResolutionDecision {
    ResolutionDecision {
        action: ResolutionAction::RejectWeekend,
        outcome: Outcome::Rejected,
        scheduled_interval: None,
        included_participants: BTreeSet::new(),
        excluded_participants: request.participant_ids.clone(),
        reason: WEEKEND_MESSAGE.to_string(),
        evaluated_days: Vec::new(),
        follow_up: None,
    }
}

fn failed(request: &MeetingRequest, evaluated_days: Vec<NaiveDate>, last_reason: &str) -> ResolutionDecision {
    let last = evaluated_days.last().copied().unwrap_or(request.window.latest_date);
    ResolutionDecision {
        action: ResolutionAction::RescheduleNextDay,
        outcome: Outcome::Failed,
        scheduled_interval: None,
        included_participants: BTreeSet::new(),
        excluded_participants: request.participant_ids.clone(),
        reason: format!(
            "No feasible {}-minute slot between {} and {}. {}",
            request.duration_minutes, request.window.earliest_date, last, last_reason
        ),
        evaluated_days,
        follow_up: None,
    }
}

fn scheduled_decision(
    aggregator: &Aggregator<'_>,
    request: &MeetingRequest,
    date: NaiveDate,
    resolution: DayResolution,
    rescheduled: bool,
    evaluated_days: Vec<NaiveDate>,
    horizon: NaiveDate,
) -> ResolutionDecision {
    let (action, slot, included, excluded, reason) = match resolution {
        DayResolution::ScheduleAll { slot, reason } => (
            ResolutionAction::ScheduleAll,
            slot,
            request.participant_ids.clone(),
            BTreeSet::new(),
            reason,
        ),
        DayResolution::SchedulePartial {
            slot,
            included,
            excluded,
            reason,
        } => (ResolutionAction::SchedulePartial, slot, included, excluded, reason),
        DayResolution::RescheduleNextDay { reason } => {
            unreachable!("reschedule is not a scheduled resolution: {reason}")
        }
    };

    let (action, reason) = if rescheduled {
        let first = evaluated_days.first().copied().unwrap_or(date);
        (
            ResolutionAction::RescheduleNextDay,
            format!("No feasible slot on {first}. Rescheduled to {date}. {reason}"),
        )
    } else {
        (action, reason)
    };

    let follow_up = if excluded.is_empty() {
        None
    } else {
        find_follow_up(aggregator, request, date, &slot, &excluded, horizon)
    };

    ResolutionDecision {
        action,
        outcome: Outcome::Scheduled,
        scheduled_interval: Some(slot),
        included_participants: included,
        excluded_participants: excluded,
        reason,
        evaluated_days,
        follow_up,
    }
}

/// Earliest slot for the organizer and the excluded participants after the
/// main meeting ends, searching forward through weekdays up to `horizon`.
fn find_follow_up(
    aggregator: &Aggregator<'_>,
    request: &MeetingRequest,
    date: NaiveDate,
    main: &Interval,
    excluded: &BTreeSet<ParticipantId>,
    horizon: NaiveDate,
) -> Option<FollowUp> {
    let mut participants = excluded.clone();
    participants.insert(request.organizer_id.clone());

    let same_day = find_slot_after(aggregator, date, request.duration_minutes, &participants, main.end());
    if let Some(interval) = same_day {
        return Some(FollowUp {
            participants,
            interval,
        });
    }

    let mut day = next_weekday(date)?;
    while day <= horizon {
        if let Some(interval) = find_slot(aggregator, day, request.duration_minutes, &participants) {
            return Some(FollowUp {
                participants,
                interval,
            });
        }
        day = next_weekday(day)?;
    }

    debug!("no follow-up slot for {} before {horizon}", join(excluded));
    None
}
