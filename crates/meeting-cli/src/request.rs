//! The request file read by the CLI, and its conversion into engine inputs.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use meeting_engine::response::{busy_intervals, CalendarEvent, RequestEnvelope};
use meeting_engine::{
    Availability, DateWindow, Importance, Interval, MeetingRequest, ParticipantAvailability,
    ParticipantId, ResolutionDecision,
};
use serde::Deserialize;

const DEFAULT_DURATION_MINUTES: i64 = 30;

const URGENT_KEYWORDS: &[&str] = &[
    "urgent", "critical", "asap", "emergency", "client", "customer", "ceo", "board",
];
const LOW_KEYWORDS: &[&str] = &["lunch", "coffee", "break", "personal", "training"];
/// Whole words in a subject that make every attendee indispensable.
const EVERYONE_KEYWORDS: &[&str] = &["all", "team", "everyone", "together"];

#[derive(Debug, Deserialize)]
struct AttendeeRef {
    email: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestFile {
    #[serde(flatten)]
    pub envelope: RequestEnvelope,
    #[serde(rename = "Attendees", default)]
    attendees: Vec<AttendeeRef>,
    #[serde(default = "default_duration")]
    duration_minutes: i64,
    earliest_date: NaiveDate,
    #[serde(default)]
    latest_date: Option<NaiveDate>,
    #[serde(default)]
    importance: Option<Importance>,
    /// Participants whose absence should block scheduling.
    #[serde(default)]
    critical: Vec<String>,
    #[serde(default)]
    pub calendars: BTreeMap<ParticipantId, Vec<CalendarEvent>>,
}

fn default_duration() -> i64 {
    DEFAULT_DURATION_MINUTES
}

impl RequestFile {
    /// Build the engine request. Importance falls back to the subject heuristic.
    pub fn meeting_request(&self) -> Result<MeetingRequest> {
        let organizer = self.envelope.from.trim();
        if organizer.is_empty() {
            bail!("request has no organizer: the \"From\" field is empty");
        }

        let mut participant_ids: BTreeSet<ParticipantId> =
            self.attendees.iter().map(|a| a.email.clone()).collect();
        participant_ids.insert(organizer.to_string());

        Ok(MeetingRequest {
            duration_minutes: self.duration_minutes,
            window: DateWindow {
                earliest_date: self.earliest_date,
                latest_date: self.latest_date.unwrap_or(self.earliest_date),
            },
            importance: self
                .importance
                .unwrap_or_else(|| importance_from_subject(&self.envelope.subject)),
            organizer_id: organizer.to_string(),
            participant_ids,
        })
    }

    /// Busy intervals per participant. Participants without calendar data are
    /// left out (and so treated as available) unless they are marked critical.
    ///
    /// Low-priority events do not block: the meeting may be booked over them.
    /// A subject that calls for everyone marks every attendee critical.
    pub fn availability(&self) -> Availability {
        let mut availability: Availability = self
            .calendars
            .iter()
            .map(|(id, events)| {
                let blocking = events.iter().filter(|e| !is_overridable(e));
                (
                    id.clone(),
                    ParticipantAvailability::new(id.clone(), busy_intervals(blocking)),
                )
            })
            .collect();

        let mut critical: BTreeSet<&str> = self.critical.iter().map(String::as_str).collect();
        if requires_everyone(&self.envelope.subject) {
            critical.extend(self.attendees.iter().map(|a| a.email.as_str()));
        }

        for id in critical {
            let entry = availability
                .remove(id)
                .unwrap_or_else(|| ParticipantAvailability::new(id, Vec::new()));
            availability.insert(id.to_string(), entry.critical());
        }

        availability
    }

    /// Low-priority events of included participants that overlap the booked slot.
    pub fn overridden_events(&self, decision: &ResolutionDecision) -> Vec<(&str, &CalendarEvent)> {
        let Some(slot) = decision.scheduled_interval() else {
            return Vec::new();
        };
        decision
            .included_participants()
            .iter()
            .filter_map(|id| self.calendars.get_key_value(id))
            .flat_map(|(id, events)| {
                events
                    .iter()
                    .filter(move |e| {
                        is_overridable(e)
                            && Interval::new(e.start, e.end).is_ok_and(|iv| iv.overlaps(&slot))
                    })
                    .map(move |e| (id.as_str(), e))
            })
            .collect()
    }
}

/// An event may be booked over when its summary reads as low priority.
fn is_overridable(event: &CalendarEvent) -> bool {
    event
        .summary
        .as_deref()
        .is_some_and(|s| importance_from_subject(s) == Importance::Low)
}

/// True when the subject asks for the whole group, e.g. "Team planning".
pub fn requires_everyone(subject: &str) -> bool {
    subject
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| EVERYONE_KEYWORDS.contains(&word))
}

/// Derive request importance from subject keywords.
pub fn importance_from_subject(subject: &str) -> Importance {
    let subject = subject.to_lowercase();
    if URGENT_KEYWORDS.iter().any(|k| subject.contains(k)) {
        Importance::Urgent
    } else if LOW_KEYWORDS.iter().any(|k| subject.contains(k)) {
        Importance::Low
    } else {
        Importance::Normal
    }
}
