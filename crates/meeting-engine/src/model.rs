//! Request-scoped input types: the meeting request, its date window, and each
//! participant's pre-fetched busy intervals.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::Interval;

/// Participant identifier (an email address in practice).
pub type ParticipantId = String;

/// Calendar data keyed by participant. A participant with no entry is treated
/// as fully available.
pub type Availability = BTreeMap<ParticipantId, ParticipantAvailability>;

/// Importance of the requested meeting, derived outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Urgent,
    #[default]
    Normal,
    Low,
}

/// How indispensable a participant is to the meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantImportance {
    Critical,
    #[default]
    Normal,
}

/// One participant's busy time over the candidate days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantAvailability {
    pub participant_id: ParticipantId,
    #[serde(default)]
    pub busy_intervals: Vec<Interval>,
    #[serde(default)]
    pub importance: ParticipantImportance,
}

impl ParticipantAvailability {
    pub fn new(participant_id: impl Into<ParticipantId>, busy_intervals: Vec<Interval>) -> Self {
        let mut busy_intervals = busy_intervals;
        busy_intervals.sort();
        ParticipantAvailability {
            participant_id: participant_id.into(),
            busy_intervals,
            importance: ParticipantImportance::Normal,
        }
    }

    pub fn critical(mut self) -> Self {
        self.importance = ParticipantImportance::Critical;
        self
    }
}

/// Inclusive range of calendar dates the meeting should fall on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub earliest_date: NaiveDate,
    pub latest_date: NaiveDate,
}

impl DateWindow {
    pub fn new(earliest_date: NaiveDate, latest_date: NaiveDate) -> Result<Self> {
        let window = DateWindow {
            earliest_date,
            latest_date,
        };
        window.validate()?;
        Ok(window)
    }

    /// A window covering exactly one day.
    pub fn single(date: NaiveDate) -> Self {
        DateWindow {
            earliest_date: date,
            latest_date: date,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.earliest_date > self.latest_date {
            return Err(EngineError::InvalidWindow {
                earliest: self.earliest_date,
                latest: self.latest_date,
            });
        }
        Ok(())
    }

    /// True if either end of the window lands on a Saturday or Sunday.
    pub fn touches_weekend(&self) -> bool {
        is_weekend(self.earliest_date) || is_weekend(self.latest_date)
    }
}

/// The meeting to schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub duration_minutes: i64,
    pub window: DateWindow,
    #[serde(default)]
    pub importance: Importance,
    pub organizer_id: ParticipantId,
    /// Every attendee, organizer included.
    pub participant_ids: BTreeSet<ParticipantId>,
}

impl MeetingRequest {
    /// Reject malformed requests before they reach the engine.
    ///
    /// # Errors
    /// - `NonPositiveDuration` if `duration_minutes <= 0`
    /// - `EmptyParticipants` if there are no participants
    /// - `OrganizerNotParticipant` if the organizer is missing from `participant_ids`
    /// - `InvalidWindow` if the window is inverted
    pub fn validate(&self) -> Result<()> {
        if self.duration_minutes <= 0 {
            return Err(EngineError::NonPositiveDuration(self.duration_minutes));
        }
        if self.participant_ids.is_empty() {
            return Err(EngineError::EmptyParticipants);
        }
        if !self.participant_ids.contains(&self.organizer_id) {
            return Err(EngineError::OrganizerNotParticipant(self.organizer_id.clone()));
        }
        self.window.validate()
    }

    /// Organizer plus every participant marked critical in `availability`.
    pub fn mandatory_participants(&self, availability: &Availability) -> BTreeSet<ParticipantId> {
        self.participant_ids
            .iter()
            .filter(|id| self.is_critical(id, availability))
            .cloned()
            .collect()
    }

    /// The organizer is always critical; others only when their calendar says so.
    pub fn is_critical(&self, id: &str, availability: &Availability) -> bool {
        id == self.organizer_id
            || availability
                .get(id)
                .is_some_and(|p| p.importance == ParticipantImportance::Critical)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first weekday strictly after `date`.
pub fn next_weekday(date: NaiveDate) -> Option<NaiveDate> {
    let mut next = date.checked_add_days(Days::new(1))?;
    while is_weekend(next) {
        next = next.checked_add_days(Days::new(1))?;
    }
    Some(next)
}
