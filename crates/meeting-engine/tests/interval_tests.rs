//! Tests for the interval model: overlap, merge, subtract and intersection.

use chrono::{DateTime, TimeZone, Utc};
use meeting_engine::interval::{intersect_all, merge, overlaps, subtract, Interval};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 17, hour, min, 0).unwrap()
}

fn iv(start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> Interval {
    Interval::new(at(start_hour, start_min), at(end_hour, end_min)).unwrap()
}

// ── overlaps ────────────────────────────────────────────────────────────────

#[test]
fn partially_overlapping_intervals_overlap() {
    // 09:00-10:00 and 09:30-10:30 share 30 minutes
    assert!(overlaps(&iv(9, 0, 10, 0), &iv(9, 30, 10, 30)));
    assert_eq!(
        iv(9, 0, 10, 0).intersection(&iv(9, 30, 10, 30)).map(|i| i.duration_minutes()),
        Some(30)
    );
}

#[test]
fn adjacent_intervals_do_not_overlap() {
    // 09:00-10:00 then 10:00-11:00: end == start is not a conflict
    assert!(!overlaps(&iv(9, 0, 10, 0), &iv(10, 0, 11, 0)));
    assert!(!overlaps(&iv(10, 0, 11, 0), &iv(9, 0, 10, 0)));
}

#[test]
fn contained_interval_overlaps_and_is_contained() {
    let outer = iv(9, 0, 12, 0);
    let inner = iv(10, 0, 11, 0);
    assert!(outer.overlaps(&inner));
    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
}

// ── merge ───────────────────────────────────────────────────────────────────

#[test]
fn merge_coalesces_overlapping_and_adjacent() {
    let merged = merge(&[
        iv(13, 0, 14, 0),
        iv(9, 0, 10, 30),
        iv(10, 0, 11, 0),
        iv(11, 0, 11, 30),
    ]);
    assert_eq!(merged, vec![iv(9, 0, 11, 30), iv(13, 0, 14, 0)]);
}

#[test]
fn merge_of_empty_is_empty() {
    assert!(merge(&[]).is_empty());
}

#[test]
fn merge_keeps_disjoint_intervals_sorted() {
    let merged = merge(&[iv(15, 0, 16, 0), iv(9, 0, 10, 0)]);
    assert_eq!(merged, vec![iv(9, 0, 10, 0), iv(15, 0, 16, 0)]);
}

// ── subtract ────────────────────────────────────────────────────────────────

#[test]
fn subtract_nothing_returns_whole_window() {
    assert_eq!(subtract(&iv(9, 0, 18, 0), &[]), vec![iv(9, 0, 18, 0)]);
}

#[test]
fn subtract_leaves_gaps_between_busy_blocks() {
    let free = subtract(&iv(9, 0, 18, 0), &[iv(10, 0, 11, 0), iv(14, 0, 15, 0)]);
    assert_eq!(free, vec![iv(9, 0, 10, 0), iv(11, 0, 14, 0), iv(15, 0, 18, 0)]);
}

#[test]
fn subtract_clips_busy_time_outside_window() {
    // 07:00-09:30 and 17:30-20:00 are only partly inside business hours.
    let free = subtract(&iv(9, 0, 18, 0), &[iv(7, 0, 9, 30), iv(17, 30, 20, 0)]);
    assert_eq!(free, vec![iv(9, 30, 17, 30)]);
}

#[test]
fn subtract_handles_unsorted_overlapping_busy() {
    let free = subtract(
        &iv(9, 0, 18, 0),
        &[iv(12, 0, 13, 0), iv(9, 30, 11, 0), iv(10, 30, 12, 30)],
    );
    assert_eq!(free, vec![iv(9, 0, 9, 30), iv(12, 30, 18, 0)]);
}

#[test]
fn subtract_fully_covering_busy_leaves_nothing() {
    assert!(subtract(&iv(9, 0, 18, 0), &[iv(8, 0, 19, 0)]).is_empty());
}

// ── intersect_all ───────────────────────────────────────────────────────────

#[test]
fn intersect_all_keeps_common_time_only() {
    let a = vec![iv(9, 0, 12, 0), iv(13, 0, 18, 0)];
    let b = vec![iv(11, 0, 14, 0), iv(16, 0, 17, 0)];
    assert_eq!(
        intersect_all(&a, &b),
        vec![iv(11, 0, 12, 0), iv(13, 0, 14, 0), iv(16, 0, 17, 0)]
    );
}

#[test]
fn intersect_all_with_empty_is_empty() {
    assert!(intersect_all(&[iv(9, 0, 18, 0)], &[]).is_empty());
}
