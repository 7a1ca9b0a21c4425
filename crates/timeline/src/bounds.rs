// SPDX-License-Identifier: MIT

//!
//! Slider bounds: the `[min, max]` span derived from the whole marker set,
//! and the percentage mapping of a range onto it
//!

use crate::{TimeRange, TimeSpanned};
use chrono::{DateTime, TimeZone, Utc};

/// The `[min, max]` span the slider covers.
///
/// Derived from the earliest start and latest end across all markers; when
/// there are no markers a fixed fallback span is used so the UI always has a
/// valid domain to render against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBounds {
    min: DateTime<Utc>,
    max: DateTime<Utc>,
}

impl TimeBounds {
    /// The fallback span used when the marker set is empty
    pub fn fallback() -> Self {
        TimeBounds {
            min: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(),
            max: Utc.with_ymd_and_hms(2024, 11, 30, 0, 0, 0).unwrap(),
        }
    }

    /// Derive bounds from a marker collection in one O(n) pass.
    ///
    /// min = earliest start; max = latest of (end if present, else start).
    /// An empty collection yields [`TimeBounds::fallback`], never an error.
    pub fn from_markers<'a, T, I>(markers: I) -> Self
    where
        T: TimeSpanned + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut bounds: Option<TimeBounds> = None;
        for marker in markers {
            let start = marker.span_start();
            let end = marker.span_end_or_start();
            bounds = Some(match bounds {
                None => TimeBounds {
                    min: start,
                    max: end,
                },
                Some(b) => TimeBounds {
                    min: b.min.min(start),
                    max: b.max.max(end),
                },
            });
        }
        bounds.unwrap_or_else(Self::fallback)
    }

    /// The earliest instant
    pub fn min(&self) -> DateTime<Utc> {
        self.min
    }

    /// The latest instant
    pub fn max(&self) -> DateTime<Utc> {
        self.max
    }

    /// Clamp an instant into the bounds
    pub fn clamp(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        t.max(self.min).min(self.max)
    }

    /// Project an instant onto the slider as a percentage in [0, 100].
    ///
    /// A degenerate span (`max == min`) maps everything to 0 rather than
    /// dividing by zero.
    pub fn to_pct(&self, t: DateTime<Utc>) -> f64 {
        let span_ms = (self.max - self.min).num_milliseconds();
        if span_ms == 0 {
            return 0.0;
        }
        let offset_ms = (t - self.min).num_milliseconds();
        (offset_ms as f64 / span_ms as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// The inverse of [`TimeBounds::to_pct`]
    pub fn from_pct(&self, pct: f64) -> DateTime<Utc> {
        let span_ms = (self.max - self.min).num_milliseconds();
        let offset_ms = (span_ms as f64 * pct.clamp(0.0, 100.0) / 100.0).round() as i64;
        self.min + chrono::Duration::milliseconds(offset_ms)
    }

    /// Project a range onto the slider as `[start_pct, end_pct]`
    pub fn to_slider(&self, range: TimeRange) -> [f64; 2] {
        [self.to_pct(range.start()), self.to_pct(range.end())]
    }

    /// Convert two slider percentages back to a range.  The percentages are
    /// sorted ascending first, so a handle dragged past its partner swaps
    /// roles instead of inverting the range.
    pub fn from_slider(&self, pcts: [f64; 2]) -> TimeRange {
        let (lo, hi) = if pcts[0] <= pcts[1] {
            (pcts[0], pcts[1])
        } else {
            (pcts[1], pcts[0])
        };
        TimeRange::new(self.from_pct(lo), self.from_pct(hi))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    type Span = (DateTime<Utc>, Option<DateTime<Utc>>);

    #[test]
    fn empty_set_falls_back() {
        let markers: Vec<Span> = vec![];
        let bounds = TimeBounds::from_markers(&markers);
        assert_eq!(bounds, TimeBounds::fallback());
        assert!(bounds.min() < bounds.max());
    }

    #[test]
    fn derives_min_and_max() {
        let markers: Vec<Span> = vec![
            (instant("2024-01-05T00:00:00Z"), None),
            (
                instant("2024-01-01T00:00:00Z"),
                Some(instant("2024-01-03T00:00:00Z")),
            ),
            (
                instant("2024-01-02T00:00:00Z"),
                Some(instant("2024-01-09T00:00:00Z")),
            ),
        ];
        let bounds = TimeBounds::from_markers(&markers);
        assert_eq!(bounds.min(), instant("2024-01-01T00:00:00Z"));
        assert_eq!(bounds.max(), instant("2024-01-09T00:00:00Z"));
    }

    #[test]
    fn inverted_interval_does_not_poison_bounds() {
        let markers: Vec<Span> = vec![(
            instant("2024-01-05T00:00:00Z"),
            Some(instant("2024-01-01T00:00:00Z")),
        )];
        let bounds = TimeBounds::from_markers(&markers);
        // Normalised: the inverted end is treated as the start
        assert_eq!(bounds.min(), instant("2024-01-05T00:00:00Z"));
        assert_eq!(bounds.max(), instant("2024-01-05T00:00:00Z"));
    }

    #[test]
    fn slider_round_trip() {
        let bounds = TimeBounds {
            min: instant("2024-01-01T00:00:00Z"),
            max: instant("2024-03-01T00:00:00Z"),
        };
        let range = TimeRange::new(
            instant("2024-01-10T06:00:00Z"),
            instant("2024-02-20T18:00:00Z"),
        );

        let back = bounds.from_slider(bounds.to_slider(range));

        // Within 0.1% of the span
        let tolerance_ms = (bounds.max() - bounds.min()).num_milliseconds() / 1000;
        assert!((back.start() - range.start()).num_milliseconds().abs() <= tolerance_ms);
        assert!((back.end() - range.end()).num_milliseconds().abs() <= tolerance_ms);
    }

    #[test]
    fn degenerate_span_maps_to_zero() {
        let t = instant("2024-01-01T00:00:00Z");
        let bounds = TimeBounds { min: t, max: t };
        let range = TimeRange::new(instant("2020-01-01T00:00:00Z"), instant("2030-01-01T00:00:00Z"));
        assert_eq!(bounds.to_slider(range), [0.0, 0.0]);
    }

    #[test]
    fn from_slider_sorts_handles() {
        let bounds = TimeBounds {
            min: instant("2024-01-01T00:00:00Z"),
            max: instant("2024-01-11T00:00:00Z"),
        };
        let range = bounds.from_slider([80.0, 20.0]);
        assert_eq!(range.start(), instant("2024-01-03T00:00:00Z"));
        assert_eq!(range.end(), instant("2024-01-09T00:00:00Z"));
    }

    #[test]
    fn out_of_bounds_instants_clamp() {
        let bounds = TimeBounds {
            min: instant("2024-01-01T00:00:00Z"),
            max: instant("2024-01-11T00:00:00Z"),
        };
        assert_eq!(bounds.to_pct(instant("2020-01-01T00:00:00Z")), 0.0);
        assert_eq!(bounds.to_pct(instant("2030-01-01T00:00:00Z")), 100.0);
    }
}
