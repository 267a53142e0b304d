//! Error types for meeting-engine operations.
//!
//! These cover malformed input only. Scheduling outcomes (weekend rejection,
//! an exhausted look-ahead) are decisions, not errors.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Meeting duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),

    #[error("Meeting request has no participants")]
    EmptyParticipants,

    #[error("Organizer {0} is not one of the participants")]
    OrganizerNotParticipant(String),

    #[error("Invalid date window: {earliest} is after {latest}")]
    InvalidWindow {
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid business hours: opening {open} is not before closing {close}")]
    InvalidBusinessHours { open: NaiveTime, close: NaiveTime },

    #[error("Slot granularity must be positive, got {0} minutes")]
    InvalidGranularity(u32),

    #[error("Look-ahead must be at least one day, got {0}")]
    InvalidLookahead(u32),
}

pub type Result<T> = std::result::Result<T, EngineError>;
