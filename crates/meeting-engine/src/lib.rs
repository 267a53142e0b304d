//! # meeting-engine
//!
//! Deterministic conflict resolution and slot selection for meeting requests.
//!
//! Given a request (duration, date window, importance, organizer, participants)
//! and each participant's pre-fetched busy intervals, the engine decides whether
//! to schedule everyone, schedule a subset, move to a later day, or reject the
//! request outright, and computes the concrete slot. It performs no I/O.
//!
//! ## Modules
//!
//! - [`interval`] — half-open intervals: overlap, subtract, merge, intersect
//! - [`availability`] — per-day free time for participant subsets within business hours
//! - [`slot`] — earliest feasible slot search
//! - [`classifier`] — day classification and the resolution policy table
//! - [`engine`] — the state machine that walks candidate days
//! - [`response`] — rendering decisions into the caller-facing JSON shape
//! - [`config`] — business hours, timezone, slot grid, look-ahead
//! - [`model`] — request and availability input types
//! - [`error`] — Error types

pub mod availability;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod interval;
pub mod model;
pub mod response;
pub mod slot;

pub use availability::Aggregator;
pub use classifier::{classify, Classification};
pub use config::EngineConfig;
pub use engine::{resolve, Outcome, ResolutionAction, ResolutionDecision, Resolver, WEEKEND_MESSAGE};
pub use error::EngineError;
pub use interval::{merge, overlaps, subtract, Interval};
pub use model::{
    Availability, DateWindow, Importance, MeetingRequest, ParticipantAvailability, ParticipantId,
    ParticipantImportance,
};
pub use slot::find_slot;
