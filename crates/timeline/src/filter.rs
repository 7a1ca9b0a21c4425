// SPDX-License-Identifier: MIT

//!
//! The two visibility predicates: coarse range overlap (raw chronology) and
//! instant containment (granularity-bucketed)
//!

use crate::{Granularity, TimeRange, TimeSpanned};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Whether a marker is active at instant `t` under a granularity.
///
/// Bucketed comparison: a marker whose start differs from `t` by less than
/// one granularity unit still counts as started, which stops pins
/// flickering as the scrubber moves within a bucket.  A marker without an
/// end time stays active from its start bucket onwards.
pub fn is_active_at<T: TimeSpanned>(marker: &T, t: DateTime<Utc>, granularity: Granularity) -> bool {
    if granularity.compare(marker.span_start(), t) == Ordering::Greater {
        return false;
    }
    match marker.span_end() {
        None => true,
        Some(end) => granularity.compare(end, t) != Ordering::Less,
    }
}

/// Whether a marker's interval overlaps the selected range.
///
/// Raw chronological comparison (no bucketing): this is the cheap, exact
/// pre-filter over the whole marker set.  The marker's end is normalised via
/// [`TimeSpanned::span_end_or_start`], so inverted intervals behave as
/// instantaneous events instead of vanishing or panicking.
pub fn overlaps_range<T: TimeSpanned>(marker: &T, range: TimeRange) -> bool {
    marker.span_start() <= range.end() && marker.span_end_or_start() >= range.start()
}

/// The subset of markers overlapping the selected range (range mode)
pub fn visible_in_range<'a, T: TimeSpanned>(
    markers: &'a [T],
    range: TimeRange,
) -> impl Iterator<Item = &'a T> {
    markers.iter().filter(move |m| overlaps_range(*m, range))
}

/// The subset of markers active at an instant (single-instant mode)
pub fn active_at<'a, T: TimeSpanned>(
    markers: &'a [T],
    t: DateTime<Utc>,
    granularity: Granularity,
) -> impl Iterator<Item = &'a T> {
    markers.iter().filter(move |m| is_active_at(*m, t, granularity))
}

/// How many markers are active at an instant (the badge next to the slider)
pub fn active_count<T: TimeSpanned>(
    markers: &[T],
    t: DateTime<Utc>,
    granularity: Granularity,
) -> usize {
    active_at(markers, t, granularity).count()
}

#[cfg(test)]
mod test {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    type Span = (DateTime<Utc>, Option<DateTime<Utc>>);

    fn span(start: &str, end: Option<&str>) -> Span {
        (instant(start), end.map(instant))
    }

    #[test]
    fn range_overlap_concrete_cases() {
        let a = span("2024-01-01T00:00:00Z", Some("2024-01-05T00:00:00Z"));
        let b = span("2024-01-04T00:00:00Z", Some("2024-01-10T00:00:00Z"));

        let jan3 = TimeRange::at(instant("2024-01-03T00:00:00Z"));
        assert!(overlaps_range(&a, jan3));
        assert!(overlaps_range(&b, jan3));

        let jan6 = TimeRange::at(instant("2024-01-06T00:00:00Z"));
        assert!(!overlaps_range(&a, jan6));
        assert!(overlaps_range(&b, jan6));
    }

    #[test]
    fn instantaneous_marker_overlaps_only_its_instant() {
        let m = span("2024-01-03T12:00:00Z", None);
        assert!(overlaps_range(
            &m,
            TimeRange::new(instant("2024-01-03T00:00:00Z"), instant("2024-01-04T00:00:00Z"))
        ));
        assert!(!overlaps_range(
            &m,
            TimeRange::new(instant("2024-01-04T00:00:00Z"), instant("2024-01-05T00:00:00Z"))
        ));
    }

    #[test]
    fn inverted_interval_does_not_panic_or_vanish() {
        // end < start: normalised to an instantaneous event at start
        let m = span("2024-01-05T00:00:00Z", Some("2024-01-01T00:00:00Z"));
        assert!(overlaps_range(&m, TimeRange::at(instant("2024-01-05T00:00:00Z"))));
        assert!(!overlaps_range(&m, TimeRange::at(instant("2024-01-03T00:00:00Z"))));
    }

    #[test]
    fn instant_containment_uses_buckets() {
        let marker = span("2024-03-15T23:00:00Z", None);
        let t = instant("2024-03-16T01:00:00Z");

        // Different day buckets: the marker started the previous day, so it
        // is active (start <= t); a marker starting the NEXT day is not
        assert!(is_active_at(&marker, t, Granularity::Day));
        let later = span("2024-03-17T00:00:00Z", None);
        assert!(!is_active_at(&later, t, Granularity::Day));

        // Same month bucket
        assert!(is_active_at(&marker, t, Granularity::Month));

        // With an end time before t's day bucket, day granularity hides it
        let ended = span("2024-03-14T00:00:00Z", Some("2024-03-15T23:00:00Z"));
        assert!(!is_active_at(&ended, t, Granularity::Day));
        assert!(is_active_at(&ended, t, Granularity::Month));
    }

    #[test]
    fn sub_unit_differences_do_not_flicker() {
        // Marker ends 00:05, scrubber at 00:50 the same day: different hour
        // buckets but the same day bucket, so day granularity keeps the pin
        // visible while hour granularity drops it
        let m = span("2024-06-01T08:00:00Z", Some("2024-06-02T00:05:00Z"));
        let t = instant("2024-06-02T00:50:00Z");
        assert!(!is_active_at(&m, t, Granularity::Hour));
        assert!(is_active_at(&m, t, Granularity::Day));
        assert!(is_active_at(&m, t, Granularity::Month));
    }

    #[test]
    fn counts() {
        let markers = vec![
            span("2024-01-01T00:00:00Z", Some("2024-01-05T00:00:00Z")),
            span("2024-01-04T00:00:00Z", Some("2024-01-10T00:00:00Z")),
            span("2024-02-01T00:00:00Z", None),
        ];
        let t = instant("2024-01-04T12:00:00Z");
        assert_eq!(active_count(&markers, t, Granularity::Day), 2);
        assert_eq!(
            visible_in_range(&markers, TimeRange::at(t)).count(),
            2
        );
    }
}
