// SPDX-License-Identifier: MIT

//!
//! Granularity: the bucket unit used to coarsen time comparisons, and the
//! unit of a single step/tick
//!

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const MS_PER_HOUR: i64 = 1000 * 60 * 60;
const MS_PER_DAY: i64 = MS_PER_HOUR * 24;

/// The bucket unit (hour/day/month/year) used to coarsen time comparisons
/// and to size a single playback step
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    #[default]
    Day,
    Month,
    Year,
}

impl Granularity {
    /// The bucket index an instant falls into at this granularity.
    ///
    /// Two instants are equal under a granularity iff their buckets are
    /// equal: same calendar year (year), same (year, month) (month), same
    /// UTC day index (day), same UTC hour index (hour).  Euclidean division
    /// keeps pre-1970 instants in the right bucket.
    pub fn bucket(&self, t: DateTime<Utc>) -> i64 {
        match self {
            Granularity::Year => t.year() as i64,
            Granularity::Month => t.year() as i64 * 100 + t.month0() as i64,
            Granularity::Day => t.timestamp_millis().div_euclid(MS_PER_DAY),
            Granularity::Hour => t.timestamp_millis().div_euclid(MS_PER_HOUR),
        }
    }

    /// Compare two instants at this granularity.  Total order, consistent
    /// with chronological order of the bucket starts.
    pub fn compare(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> Ordering {
        self.bucket(a).cmp(&self.bucket(b))
    }

    /// The instant one unit later.  Hour/day are fixed millisecond
    /// increments; month/year are calendar-aware (a month step from 31 Jan
    /// lands on the last day of February).  `None` if the result would
    /// overflow chrono's representable range.
    pub fn advance(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Granularity::Hour => t.checked_add_signed(Duration::hours(1)),
            Granularity::Day => t.checked_add_signed(Duration::days(1)),
            Granularity::Month => t.checked_add_months(Months::new(1)),
            Granularity::Year => t.checked_add_months(Months::new(12)),
        }
    }

    /// The instant one unit earlier — the mirror of [`Granularity::advance`]
    pub fn retreat(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Granularity::Hour => t.checked_sub_signed(Duration::hours(1)),
            Granularity::Day => t.checked_sub_signed(Duration::days(1)),
            Granularity::Month => t.checked_sub_months(Months::new(1)),
            Granularity::Year => t.checked_sub_months(Months::new(12)),
        }
    }

    /// Format an instant with detail appropriate to this granularity (used
    /// for slider end labels and the current-position readout)
    pub fn format_at(&self, t: DateTime<Utc>) -> String {
        match self {
            Granularity::Hour => t.format("%d %b %H:%M").to_string(),
            Granularity::Day => t.format("%d %b %Y").to_string(),
            Granularity::Month => t.format("%B %Y").to_string(),
            Granularity::Year => t.format("%Y").to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn bucket_boundaries() {
        let late = instant("2024-03-15T23:00:00Z");
        let early = instant("2024-03-16T01:00:00Z");

        // Different UTC days, two hours apart
        assert_ne!(Granularity::Day.bucket(late), Granularity::Day.bucket(early));
        assert_eq!(Granularity::Day.compare(late, early), Ordering::Less);

        // Same month bucket
        assert_eq!(
            Granularity::Month.compare(late, early),
            Ordering::Equal
        );

        // Same year bucket
        assert_eq!(Granularity::Year.compare(late, early), Ordering::Equal);

        // Different hours
        assert_eq!(Granularity::Hour.compare(late, early), Ordering::Less);
    }

    #[test]
    fn month_bucket_does_not_collide_across_years() {
        // Dec 2023 vs Jan 2024 must order correctly
        let dec = instant("2023-12-31T23:59:00Z");
        let jan = instant("2024-01-01T00:01:00Z");
        assert_eq!(Granularity::Month.compare(dec, jan), Ordering::Less);
    }

    #[test]
    fn pre_epoch_day_buckets() {
        let a = Utc.with_ymd_and_hms(1969, 12, 31, 23, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(1970, 1, 1, 1, 0, 0).unwrap();
        assert_eq!(Granularity::Day.compare(a, b), Ordering::Less);
        assert_eq!(Granularity::Day.compare(a, a), Ordering::Equal);
    }

    #[test]
    fn advance_is_calendar_aware() {
        let end_of_jan = instant("2024-01-31T12:00:00Z");
        let stepped = Granularity::Month.advance(end_of_jan).unwrap();
        // 2024 is a leap year; the day clamps to 29
        assert_eq!(stepped, instant("2024-02-29T12:00:00Z"));

        let year_stepped = Granularity::Year.advance(instant("2024-02-29T00:00:00Z")).unwrap();
        assert_eq!(year_stepped, instant("2025-02-28T00:00:00Z"));
    }

    #[test]
    fn advance_and_retreat_fixed_units() {
        let t = instant("2024-06-01T00:00:00Z");
        assert_eq!(
            Granularity::Hour.advance(t).unwrap(),
            instant("2024-06-01T01:00:00Z")
        );
        assert_eq!(
            Granularity::Day.retreat(t).unwrap(),
            instant("2024-05-31T00:00:00Z")
        );
    }
}
