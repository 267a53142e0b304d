//! Engine configuration: business hours, timezone, slot grid and look-ahead.
//!
//! Passed explicitly into the aggregator and resolver; nothing is read from
//! process-wide state.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Default opening time, 09:00 local.
pub const DEFAULT_OPEN_HOUR: u32 = 9;
/// Default closing time, 18:00 local.
pub const DEFAULT_CLOSE_HOUR: u32 = 18;
/// Default slot grid in minutes.
pub const DEFAULT_GRANULARITY_MINUTES: u32 = 15;
/// Default reschedule bound in calendar days.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Local time at which meetings may start.
    pub business_open: NaiveTime,
    /// Local time by which meetings must end.
    pub business_close: NaiveTime,
    /// IANA timezone the business hours are expressed in (e.g. "Asia/Kolkata").
    pub timezone: String,
    /// Slot starts are aligned to this grid, anchored at `business_open`.
    pub slot_granularity_minutes: u32,
    /// How many calendar days past the window end the engine may reschedule.
    pub lookahead_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            business_open: hour(DEFAULT_OPEN_HOUR),
            business_close: hour(DEFAULT_CLOSE_HOUR),
            timezone: "UTC".to_string(),
            slot_granularity_minutes: DEFAULT_GRANULARITY_MINUTES,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
        }
    }
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl EngineConfig {
    /// Parse the configured timezone.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidTimezone` if it is not a valid IANA identifier.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| EngineError::InvalidTimezone(self.timezone.clone()))
    }

    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.business_open >= self.business_close {
            return Err(EngineError::InvalidBusinessHours {
                open: self.business_open,
                close: self.business_close,
            });
        }
        if self.slot_granularity_minutes == 0 {
            return Err(EngineError::InvalidGranularity(0));
        }
        if self.lookahead_days == 0 {
            return Err(EngineError::InvalidLookahead(0));
        }
        self.tz().map(|_| ())
    }
}
