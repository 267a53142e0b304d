//! Per-day availability aggregation across participants.
//!
//! Each participant's raw busy intervals (which may span several days or fall
//! outside business hours) are clipped to one day's business-hours window and
//! subtracted from it. The free time of a subset of participants is the
//! intersection of their individual free time.
//!
//! Participants without calendar data are treated as free all day.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::interval::{self, Interval};
use crate::model::{Availability, ParticipantId};

/// The free/busy picture of one day for a set of participants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    /// `None` when the business hours of this date cannot be resolved.
    pub business_hours: Option<Interval>,
    /// Moments when every participant in the subset is free, snapped to the slot grid.
    pub common_free: Vec<Interval>,
}

/// Computes free time for participant subsets from pre-fetched calendars.
#[derive(Debug, Clone)]
pub struct Aggregator<'a> {
    config: &'a EngineConfig,
    tz: Tz,
    availability: &'a Availability,
}

impl<'a> Aggregator<'a> {
    /// # Errors
    /// Returns the first configuration problem reported by [`EngineConfig::validate`].
    pub fn new(config: &'a EngineConfig, availability: &'a Availability) -> Result<Self> {
        config.validate()?;
        Ok(Aggregator {
            config,
            tz: config.tz()?,
            availability,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    pub fn availability(&self) -> &Availability {
        self.availability
    }

    /// Business-hours window of `date`, converted to UTC.
    pub fn business_hours(&self, date: NaiveDate) -> Option<Interval> {
        let open = self.local_to_utc(date, self.config.business_open)?;
        let close = self.local_to_utc(date, self.config.business_close)?;
        Interval::new(open, close).ok()
    }

    /// Resolve a local wall-clock time. Ambiguous times take the earlier
    /// instant; times skipped by a DST gap move forward by the (one-hour) gap.
    fn local_to_utc(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        let local = date.and_time(time);
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| self.tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// One participant's free intervals within business hours on `date`.
    pub fn participant_free(&self, date: NaiveDate, participant: &str) -> Vec<Interval> {
        let Some(hours) = self.business_hours(date) else {
            return Vec::new();
        };
        match self.availability.get(participant) {
            Some(calendar) => interval::subtract(&hours, &calendar.busy_intervals),
            None => vec![hours],
        }
    }

    /// True if `participant` has no busy time overlapping `slot`.
    pub fn is_free(&self, participant: &str, slot: &Interval) -> bool {
        self.availability.get(participant).is_none_or(|calendar| {
            !calendar.busy_intervals.iter().any(|busy| busy.overlaps(slot))
        })
    }

    /// Intersection of the free time of every participant in `subset` on `date`.
    ///
    /// Intervals are snapped to the slot grid and any shorter than
    /// `duration_minutes` are discarded.
    pub fn common_free(
        &self,
        date: NaiveDate,
        subset: &BTreeSet<ParticipantId>,
        duration_minutes: i64,
    ) -> Vec<Interval> {
        self.common_free_after(date, subset, duration_minutes, None)
    }

    /// Like [`Aggregator::common_free`], ignoring everything before `not_before`.
    pub fn common_free_after(
        &self,
        date: NaiveDate,
        subset: &BTreeSet<ParticipantId>,
        duration_minutes: i64,
        not_before: Option<DateTime<Utc>>,
    ) -> Vec<Interval> {
        let Some(hours) = self.business_hours(date) else {
            return Vec::new();
        };
        let searchable = match not_before {
            Some(t) if t >= hours.end() => return Vec::new(),
            Some(t) if t > hours.start() => Interval::new(t, hours.end()).ok(),
            _ => Some(hours),
        };

        let mut common: Vec<Interval> = searchable.into_iter().collect();
        for participant in subset {
            if common.is_empty() {
                break;
            }
            let free = self.participant_free(date, participant);
            common = interval::intersect_all(&common, &free);
        }

        common
            .iter()
            .filter_map(|free| self.snap(free, hours.start()))
            .filter(|free| free.duration_minutes() >= duration_minutes)
            .collect()
    }

    /// Build the full day view for `subset`, keeping every grid-aligned free interval.
    pub fn day_view(&self, date: NaiveDate, subset: &BTreeSet<ParticipantId>) -> DayAvailability {
        DayAvailability {
            date,
            business_hours: self.business_hours(date),
            common_free: self.common_free(date, subset, 0),
        }
    }

    /// Round the start up and the end down to the slot grid anchored at `anchor`.
    fn snap(&self, free: &Interval, anchor: DateTime<Utc>) -> Option<Interval> {
        let grid = i64::from(self.config.slot_granularity_minutes) * 60;
        let start_offset = (free.start() - anchor).num_seconds();
        let end_offset = (free.end() - anchor).num_seconds();

        let start = anchor + Duration::seconds(start_offset.div_euclid(grid) * grid);
        let start = if start < free.start() {
            start + Duration::seconds(grid)
        } else {
            start
        };
        let end = anchor + Duration::seconds(end_offset.div_euclid(grid) * grid);

        Interval::new(start, end).ok()
    }
}
