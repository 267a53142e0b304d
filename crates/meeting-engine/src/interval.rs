//! Half-open time intervals and the set operations the scheduler is built on.
//!
//! An [`Interval`] covers `[start, end)`. Adjacent intervals (one ends exactly
//! when the other starts) do NOT overlap, but [`merge`] still coalesces them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A non-empty, immutable time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "RawInterval")]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Unchecked wire form of [`Interval`].
#[derive(Serialize, Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for Interval {
    type Error = EngineError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Interval::new(raw.start, raw.end)
    }
}

impl From<Interval> for RawInterval {
    fn from(interval: Interval) -> Self {
        RawInterval {
            start: interval.start,
            end: interval.end,
        }
    }
}

impl Interval {
    /// Create an interval.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidInterval` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidInterval { start, end });
        }
        Ok(Interval { start, end })
    }

    /// Create an interval of `minutes` starting at `start`.
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Result<Self> {
        Interval::new(start, start + Duration::minutes(minutes))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// True iff `self.start < other.end && other.start < self.end`.
    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self, other)
    }

    /// True iff `other` lies entirely within `self`.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The overlapping part of two intervals, if any.
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Interval { start, end })
    }
}

/// Two intervals overlap when `a.start < b.end && b.start < a.end`.
///
/// Zero-length adjacency (`a.end == b.start`) is not a conflict.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && b.start < a.end
}

/// Coalesce overlapping or adjacent intervals into the minimal equivalent set.
///
/// The input may be in any order. Returns a sorted, non-overlapping,
/// non-adjacent list.
pub fn merge(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Remove every busy interval from `free`, returning the remaining sub-intervals.
///
/// Busy intervals may overlap each other and may extend past `free`; they are
/// clipped and merged first. Returns the gaps sorted by start time.
pub fn subtract(free: &Interval, busy: &[Interval]) -> Vec<Interval> {
    let clipped: Vec<Interval> = busy.iter().filter_map(|b| b.intersection(free)).collect();
    let merged = merge(&clipped);

    let mut remaining = Vec::new();
    let mut cursor = free.start;

    for busy in &merged {
        if cursor < busy.start {
            remaining.push(Interval {
                start: cursor,
                end: busy.start,
            });
        }
        cursor = cursor.max(busy.end);
    }

    // Trailing gap after the last busy period.
    if cursor < free.end {
        remaining.push(Interval {
            start: cursor,
            end: free.end,
        });
    }

    remaining
}

/// Intersect two sorted, disjoint interval lists.
///
/// Returns the moments covered by both lists, sorted and disjoint.
pub fn intersect_all(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if let Some(common) = a[i].intersection(&b[j]) {
            result.push(common);
        }
        // Advance whichever interval finishes first.
        if a[i].end <= b[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 17, h, m, 0).unwrap()
    }

    fn iv(sh: u32, sm: u32, eh: u32, em: u32) -> Interval {
        Interval::new(at(sh, sm), at(eh, em)).unwrap()
    }

    #[test]
    fn rejects_empty_and_inverted_intervals() {
        assert!(Interval::new(at(9, 0), at(9, 0)).is_err());
        assert!(Interval::new(at(10, 0), at(9, 0)).is_err());
    }

    #[test]
    fn intersection_of_disjoint_is_none() {
        assert_eq!(iv(9, 0, 10, 0).intersection(&iv(10, 0, 11, 0)), None);
        assert_eq!(
            iv(9, 0, 10, 30).intersection(&iv(10, 0, 11, 0)),
            Some(iv(10, 0, 10, 30))
        );
    }

    #[test]
    fn deserialize_rejects_inverted_interval() {
        let json = r#"{"start":"2026-03-17T10:00:00Z","end":"2026-03-17T09:00:00Z"}"#;
        assert!(serde_json::from_str::<Interval>(json).is_err());
    }
}
