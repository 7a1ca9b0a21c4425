// SPDX-License-Identifier: MIT

//!
//! The selected time range
//!

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The currently selected `[start, end]` window driving map visibility.
///
/// Always ordered: the constructor sorts its arguments, so dragging one
/// slider handle past the other swaps their roles instead of producing an
/// inverted range.  A single instant is the degenerate range where
/// `start == end`.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range from two instants in either order
    pub fn new(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        if a <= b {
            TimeRange { start: a, end: b }
        } else {
            TimeRange { start: b, end: a }
        }
    }

    /// The degenerate single-instant range (legacy single-time mode)
    pub fn at(t: DateTime<Utc>) -> Self {
        TimeRange { start: t, end: t }
    }

    /// The range's start instant
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// The range's end instant
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// The range's duration (zero for a single instant)
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the range is a single instant
    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawTimeRange::deserialize(deserializer)?;
        Ok(TimeRange::new(raw.start, raw.end))
    }
}
