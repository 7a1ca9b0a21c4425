// SPDX-License-Identifier: MIT

//!
//! *Part of the wider GeoMark project*
//!
//! The temporal filter & playback engine.  Maps a marker set plus a selected
//! time range (or instant) and a granularity to:
//!
//! - the visible subset of markers
//! - the slider position over the marker-derived bounds
//! - the next state after a step, a playback tick, or a quick jump
//!
//! Everything here is a pure transformation over immutable instants; the one
//! piece of runtime machinery is the [`Autoplay`] driver, which owns the
//! recurring tick and guarantees its timer is torn down and re-armed when
//! playback parameters change.
//!

mod autoplay;
mod bounds;
mod filter;
mod granularity;
mod playback;
mod range;

pub use autoplay::*;
pub use bounds::*;
pub use filter::*;
pub use granularity::*;
pub use playback::*;
pub use range::*;

use chrono::{DateTime, Utc};

/// Anything that occupies an interval in time.  The engine treats markers as
/// read-only `(start, end?)` pairs through this trait.
pub trait TimeSpanned {
    /// When the thing begins
    fn span_start(&self) -> DateTime<Utc>;

    /// When the thing ends, if it does (absent means an instantaneous event)
    fn span_end(&self) -> Option<DateTime<Utc>>;

    /// The inclusive upper edge of the interval.  Inverted intervals
    /// (`end < start`) are normalised up to `start` so the result is always
    /// usable as an upper bound.
    fn span_end_or_start(&self) -> DateTime<Utc> {
        self.span_end()
            .map_or(self.span_start(), |end| end.max(self.span_start()))
    }
}

impl TimeSpanned for geomark_core::Marker {
    fn span_start(&self) -> DateTime<Utc> {
        self.time_start()
    }

    fn span_end(&self) -> Option<DateTime<Utc>> {
        self.time_end()
    }
}

impl TimeSpanned for (DateTime<Utc>, Option<DateTime<Utc>>) {
    fn span_start(&self) -> DateTime<Utc> {
        self.0
    }

    fn span_end(&self) -> Option<DateTime<Utc>> {
        self.1
    }
}
