//! Render a [`ResolutionDecision`] into the JSON response consumed by callers.
//!
//! The shape (PascalCase keys, string `Duration_mins`, per-attendee event
//! lists) is fixed by the downstream consumer; times are written in the
//! configured business timezone with an explicit offset.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::engine::{Outcome, ResolutionAction, ResolutionDecision, WEEKEND_MESSAGE};
use crate::interval::Interval;
use crate::model::{MeetingRequest, ParticipantId};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Request fields echoed back verbatim in the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(rename = "Request_id", default)]
    pub request_id: String,
    #[serde(rename = "Datetime", default)]
    pub datetime: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Subject", default)]
    pub subject: String,
    #[serde(rename = "EmailContent", default)]
    pub email_content: String,
}

/// An existing calendar entry as fetched by the calendar collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEvent {
    #[serde(rename = "StartTime")]
    pub start_time: String,
    #[serde(rename = "EndTime")]
    pub end_time: String,
    #[serde(rename = "NumAttendees")]
    pub num_attendees: usize,
    #[serde(rename = "Attendees")]
    pub attendees: Vec<String>,
    #[serde(rename = "Summary")]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseAttendee {
    pub email: String,
    pub events: Vec<ResponseEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpMeeting {
    pub participants: Vec<String>,
    #[serde(rename = "EventStart")]
    pub event_start: String,
    #[serde(rename = "EventEnd")]
    pub event_end: String,
}

/// An existing low-priority event the new meeting was booked over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescheduleNeeded {
    pub email: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "StartTime")]
    pub start_time: String,
    #[serde(rename = "EndTime")]
    pub end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub resolution_action: String,
    pub resolution_reason: String,
    pub scheduling_strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub follow_up_needed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_meeting: Option<FollowUpMeeting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reschedule_needed: Vec<RescheduleNeeded>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingResponse {
    #[serde(flatten)]
    pub envelope: RequestEnvelope,
    #[serde(rename = "Attendees")]
    pub attendees: Vec<ResponseAttendee>,
    #[serde(rename = "EventStart")]
    pub event_start: String,
    #[serde(rename = "EventEnd")]
    pub event_end: String,
    #[serde(rename = "Duration_mins")]
    pub duration_mins: String,
    #[serde(rename = "MetaData")]
    pub metadata: MetaData,
}

impl MeetingResponse {
    /// Record existing events the meeting was booked over. Their owners were
    /// counted as available and need to move those events.
    pub fn with_overridden_events<'a>(
        mut self,
        events: impl IntoIterator<Item = (&'a str, &'a CalendarEvent)>,
        tz: Tz,
    ) -> Self {
        self.metadata.reschedule_needed = events
            .into_iter()
            .map(|(email, event)| RescheduleNeeded {
                email: email.to_string(),
                summary: event.summary.clone().unwrap_or_default(),
                start_time: format_time(event.start, tz),
                end_time: format_time(event.end, tz),
            })
            .collect();

        if !self.metadata.reschedule_needed.is_empty() {
            let owners: BTreeSet<&str> = self
                .metadata
                .reschedule_needed
                .iter()
                .map(|r| r.email.as_str())
                .collect();
            let owners: Vec<&str> = owners.into_iter().collect();
            self.metadata.message = Some(format!(
                "Rescheduling low-priority meetings of {} to accommodate this meeting.",
                owners.join(", ")
            ));
        }
        self
    }
}

/// Build the response for `decision`.
///
/// Every participant gets an entry listing their existing events; included
/// participants also get the new meeting, inserted in start order.
pub fn format_response(
    envelope: &RequestEnvelope,
    request: &MeetingRequest,
    decision: &ResolutionDecision,
    calendars: &BTreeMap<ParticipantId, Vec<CalendarEvent>>,
    tz: Tz,
) -> MeetingResponse {
    let slot = decision.scheduled_interval();
    let included: Vec<String> = decision.included_participants().iter().cloned().collect();

    let attendees = request
        .participant_ids
        .iter()
        .map(|email| {
            let mut timed: Vec<(DateTime<Utc>, ResponseEvent)> = calendars
                .get(email)
                .map(|events| {
                    events
                        .iter()
                        .map(|e| (e.start, existing_event(e, tz)))
                        .collect()
                })
                .unwrap_or_default();
            if let Some(slot) = slot.filter(|_| decision.included_participants().contains(email)) {
                timed.push((
                    slot.start(),
                    ResponseEvent {
                        start_time: format_time(slot.start(), tz),
                        end_time: format_time(slot.end(), tz),
                        num_attendees: included.len(),
                        attendees: included.clone(),
                        summary: envelope.subject.clone(),
                    },
                ));
            }
            timed.sort_by_key(|(start, _)| *start);
            ResponseAttendee {
                email: email.clone(),
                events: timed.into_iter().map(|(_, event)| event).collect(),
            }
        })
        .collect();

    let (event_start, event_end, duration_mins) = match slot {
        Some(slot) => (
            format_time(slot.start(), tz),
            format_time(slot.end(), tz),
            slot.duration_minutes().to_string(),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    MeetingResponse {
        envelope: envelope.clone(),
        attendees,
        event_start,
        event_end,
        duration_mins,
        metadata: metadata(decision, tz),
    }
}

fn metadata(decision: &ResolutionDecision, tz: Tz) -> MetaData {
    let mut metadata = MetaData {
        resolution_action: decision.action().as_str().to_string(),
        resolution_reason: decision.reason().to_string(),
        scheduling_strategy: scheduling_strategy(decision.action()).to_string(),
        ..MetaData::default()
    };

    match decision.outcome() {
        Outcome::Rejected => {
            metadata.status = Some("rejected".to_string());
            metadata.reason = Some(WEEKEND_MESSAGE.to_string());
            metadata.message = Some(
                "Weekend meetings are not allowed. Please schedule during business days (Monday-Friday)."
                    .to_string(),
            );
        }
        Outcome::Failed => {
            metadata.status = Some("failed".to_string());
        }
        Outcome::Scheduled => {
            metadata.follow_up_needed = decision.excluded_participants().iter().cloned().collect();
            metadata.follow_up_meeting = decision.follow_up().map(|f| FollowUpMeeting {
                participants: f.participants.iter().cloned().collect(),
                event_start: format_time(f.interval.start(), tz),
                event_end: format_time(f.interval.end(), tz),
            });
        }
    }

    metadata
}

fn scheduling_strategy(action: ResolutionAction) -> &'static str {
    match action {
        ResolutionAction::ScheduleAll => "All participants available - direct scheduling",
        ResolutionAction::SchedulePartial => "Partial scheduling with available participants",
        ResolutionAction::RescheduleNextDay => "Busy on the requested day - moved to the next feasible day",
        ResolutionAction::RejectWeekend => "Weekend request rejected",
    }
}

fn existing_event(event: &CalendarEvent, tz: Tz) -> ResponseEvent {
    ResponseEvent {
        start_time: format_time(event.start, tz),
        end_time: format_time(event.end, tz),
        num_attendees: event.attendees.len(),
        attendees: event.attendees.clone(),
        summary: event.summary.clone().unwrap_or_else(|| "No Title".to_string()),
    }
}

/// Format an instant in `tz` as `2026-03-17T09:00:00+05:30`.
pub fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(TIME_FORMAT).to_string()
}

/// Busy intervals for the engine, skipping events whose end is not after their start.
pub fn busy_intervals<'a>(events: impl IntoIterator<Item = &'a CalendarEvent>) -> Vec<Interval> {
    events
        .into_iter()
        .filter_map(|e| Interval::new(e.start, e.end).ok())
        .collect()
}
