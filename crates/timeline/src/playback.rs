// SPDX-License-Identifier: MIT

//!
//! The step/playback state machine over the selected range
//!

use crate::{Granularity, TimeBounds, TimeRange, TimeSpanned, overlaps_range};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The slowest playback speed accepted
pub const MIN_SPEED: f64 = 0.25;

/// The fastest playback speed accepted
pub const MAX_SPEED: f64 = 10.0;

/// Playback parameters: playing/paused, speed multiplier, step unit.
///
/// Created with defaults when the owning view mounts; mutated only by
/// explicit user actions or by a tick reaching the upper bound.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    is_playing: bool,
    speed: f64,
    granularity: Granularity,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState {
            is_playing: false,
            speed: 1.0,
            granularity: Granularity::default(),
        }
    }
}

impl PlaybackState {
    /// Whether autoplay is running
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// The speed multiplier
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The step unit
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Set the speed multiplier, clamped into `[MIN_SPEED, MAX_SPEED]`
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// One tick fires every `1000 / speed` milliseconds
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis((1000.0 / self.speed) as u64)
    }
}

/// What a step or tick did to the range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The range moved one granularity unit
    Stepped,

    /// The step was rejected because it would leave the bounds; the range is
    /// unchanged
    AtBound,
}

/// The time scrubber: bounds, selected range and playback parameters.
///
/// ```text
/// Paused --(toggle)--> Playing
/// Playing --(toggle)--> Paused
/// Playing --(tick: step ok)--> Playing
/// Playing --(tick: would pass max)--> Paused
/// ```
///
/// Long-lived UI state with no terminal state; it is torn down with its
/// owning view.  All transitions are pure value updates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scrubber {
    bounds: TimeBounds,
    range: TimeRange,
    playback: PlaybackState,
}

impl Scrubber {
    /// Start paused over the full span of the given bounds
    pub fn new(bounds: TimeBounds) -> Self {
        Scrubber {
            bounds,
            range: TimeRange::new(bounds.min(), bounds.max()),
            playback: PlaybackState::default(),
        }
    }

    /// Derive bounds from the marker set and start paused over the full span
    pub fn from_markers<'a, T, I>(markers: I) -> Self
    where
        T: TimeSpanned + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        Self::new(TimeBounds::from_markers(markers))
    }

    /// The slider bounds
    pub fn bounds(&self) -> TimeBounds {
        self.bounds
    }

    /// Replace the bounds (the marker set changed).  The selected range is
    /// clamped endpoint-by-endpoint into the new bounds.
    pub fn set_bounds(&mut self, bounds: TimeBounds) {
        self.bounds = bounds;
        self.range = TimeRange::new(
            bounds.clamp(self.range.start()),
            bounds.clamp(self.range.end()),
        );
    }

    /// The selected range
    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Select a new range, clamped endpoint-by-endpoint into the bounds
    pub fn set_range(&mut self, range: TimeRange) {
        self.range = TimeRange::new(
            self.bounds.clamp(range.start()),
            self.bounds.clamp(range.end()),
        );
    }

    /// The playback parameters
    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    /// Toggle playing/paused
    pub fn toggle_playing(&mut self) {
        self.playback.is_playing = !self.playback.is_playing;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.playback.is_playing = false;
    }

    /// Change the speed multiplier; the running state is unaffected
    pub fn set_speed(&mut self, speed: f64) {
        self.playback.set_speed(speed);
    }

    /// Change the step unit; the running state is unaffected
    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.playback.granularity = granularity;
    }

    /// Advance the range by one granularity unit.
    ///
    /// Both endpoints shift together, so hour/day steps preserve the range's
    /// duration exactly and month/year steps preserve its calendar shape.  A
    /// step whose resulting end would pass the upper bound is rejected and
    /// the range is left unchanged.
    pub fn step_forward(&mut self) -> StepOutcome {
        let granularity = self.playback.granularity;
        let shifted = granularity
            .advance(self.range.start())
            .zip(granularity.advance(self.range.end()));
        match shifted {
            Some((start, end)) if end <= self.bounds.max() => {
                self.range = TimeRange::new(start, end);
                StepOutcome::Stepped
            }
            _ => StepOutcome::AtBound,
        }
    }

    /// Retreat the range by one granularity unit.  A step whose resulting
    /// start would pass the lower bound is rejected; backward stepping never
    /// autoplays, so there is no playback side effect here.
    pub fn step_backward(&mut self) -> StepOutcome {
        let granularity = self.playback.granularity;
        let shifted = granularity
            .retreat(self.range.start())
            .zip(granularity.retreat(self.range.end()));
        match shifted {
            Some((start, end)) if start >= self.bounds.min() => {
                self.range = TimeRange::new(start, end);
                StepOutcome::Stepped
            }
            _ => StepOutcome::AtBound,
        }
    }

    /// One autoplay tick: exactly one forward step.  Reaching the upper
    /// bound pauses playback.
    pub fn tick(&mut self) -> StepOutcome {
        let outcome = self.step_forward();
        if outcome == StepOutcome::AtBound {
            self.playback.is_playing = false;
        }
        outcome
    }

    /// Quick jump: the window `[now - days, now]`, each endpoint clamped
    /// into the bounds independently.  The window may collapse to a single
    /// instant when the data span lies entirely outside it.
    pub fn jump_back_days(&mut self, days: i64, now: DateTime<Utc>) {
        let start = self.bounds.clamp(now - Duration::days(days));
        let end = self.bounds.clamp(now);
        self.range = TimeRange::new(start, end);
    }

    /// Quick jump to the earliest data, preserving the range's duration
    /// where the span allows
    pub fn jump_to_earliest(&mut self) {
        let duration = self.range.duration();
        let start = self.bounds.min();
        let end = self.bounds.clamp(start + duration);
        self.range = TimeRange::new(start, end);
    }

    /// Quick jump to the latest data, preserving the range's duration where
    /// the span allows
    pub fn jump_to_latest(&mut self) {
        let duration = self.range.duration();
        let end = self.bounds.max();
        let start = self.bounds.clamp(end - duration);
        self.range = TimeRange::new(start, end);
    }

    /// The current slider position as `[start_pct, end_pct]`
    pub fn slider_position(&self) -> [f64; 2] {
        self.bounds.to_slider(self.range)
    }

    /// Select the range matching two slider percentages
    pub fn set_range_from_slider(&mut self, pcts: [f64; 2]) {
        self.range = self.bounds.from_slider(pcts);
    }

    /// The subset of markers overlapping the selected range
    pub fn visible<'a, T: TimeSpanned>(&self, markers: &'a [T]) -> Vec<&'a T> {
        let range = self.range;
        markers.iter().filter(|m| overlaps_range(*m, range)).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn bounds(min: &str, max: &str) -> TimeBounds {
        type Span = (DateTime<Utc>, Option<DateTime<Utc>>);
        let markers: Vec<Span> = vec![(instant(min), Some(instant(max)))];
        TimeBounds::from_markers(&markers)
    }

    #[test]
    fn initial_state_is_paused_over_full_span() {
        let scrubber = Scrubber::new(bounds("2024-01-01T00:00:00Z", "2024-01-10T00:00:00Z"));
        assert!(!scrubber.playback().is_playing());
        assert_eq!(scrubber.range().start(), instant("2024-01-01T00:00:00Z"));
        assert_eq!(scrubber.range().end(), instant("2024-01-10T00:00:00Z"));
    }

    #[test]
    fn day_step_preserves_duration() {
        let mut scrubber = Scrubber::new(bounds("2024-01-01T00:00:00Z", "2024-01-10T00:00:00Z"));
        scrubber.set_range(TimeRange::new(
            instant("2024-01-02T00:00:00Z"),
            instant("2024-01-04T00:00:00Z"),
        ));

        assert_eq!(scrubber.step_forward(), StepOutcome::Stepped);
        assert_eq!(scrubber.range().start(), instant("2024-01-03T00:00:00Z"));
        assert_eq!(scrubber.range().end(), instant("2024-01-05T00:00:00Z"));
        assert_eq!(scrubber.range().duration(), Duration::days(2));

        assert_eq!(scrubber.step_backward(), StepOutcome::Stepped);
        assert_eq!(scrubber.range().start(), instant("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn month_step_is_calendar_aware() {
        let mut scrubber = Scrubber::new(bounds("2024-01-01T00:00:00Z", "2024-12-31T00:00:00Z"));
        scrubber.set_granularity(Granularity::Month);
        scrubber.set_range(TimeRange::new(
            instant("2024-01-31T00:00:00Z"),
            instant("2024-01-31T12:00:00Z"),
        ));

        assert_eq!(scrubber.step_forward(), StepOutcome::Stepped);
        // Day clamps to the leap-year end of February
        assert_eq!(scrubber.range().start(), instant("2024-02-29T00:00:00Z"));
        assert_eq!(scrubber.range().end(), instant("2024-02-29T12:00:00Z"));
    }

    #[test]
    fn forward_clamp_stops_autoplay() {
        let mut scrubber = Scrubber::new(bounds("2024-01-01T00:00:00Z", "2024-01-10T00:00:00Z"));
        scrubber.set_range(TimeRange::new(
            instant("2024-01-09T00:00:00Z"),
            instant("2024-01-10T00:00:00Z"),
        ));
        scrubber.toggle_playing();
        assert!(scrubber.playback().is_playing());

        let before = scrubber.range();
        assert_eq!(scrubber.tick(), StepOutcome::AtBound);
        assert_eq!(scrubber.range(), before);
        assert!(!scrubber.playback().is_playing());
    }

    #[test]
    fn backward_clamp_has_no_playback_side_effect() {
        let mut scrubber = Scrubber::new(bounds("2024-01-01T00:00:00Z", "2024-01-10T00:00:00Z"));
        scrubber.set_range(TimeRange::new(
            instant("2024-01-01T00:00:00Z"),
            instant("2024-01-02T00:00:00Z"),
        ));
        scrubber.toggle_playing();

        let before = scrubber.range();
        assert_eq!(scrubber.step_backward(), StepOutcome::AtBound);
        assert_eq!(scrubber.range(), before);
        // Still playing: backward stepping never autoplays, so it never
        // pauses either
        assert!(scrubber.playback().is_playing());
    }

    #[test]
    fn quick_jump_clamps_each_endpoint() {
        let mut scrubber = Scrubber::new(bounds("2024-01-01T00:00:00Z", "2024-01-10T00:00:00Z"));

        // "Now" far outside the data span: a 30 day lookback covers the
        // whole span, both endpoints clamp to it
        let now = Utc.with_ymd_and_hms(2024, 1, 25, 0, 0, 0).unwrap();
        scrubber.jump_back_days(30, now);
        assert_eq!(scrubber.range().start(), instant("2024-01-01T00:00:00Z"));
        assert_eq!(scrubber.range().end(), instant("2024-01-10T00:00:00Z"));

        // "Now" even further out: the window collapses to the max
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        scrubber.jump_back_days(7, now);
        assert!(scrubber.range().is_instant());
        assert_eq!(scrubber.range().start(), instant("2024-01-10T00:00:00Z"));
    }

    #[test]
    fn jump_to_bounds_preserve_duration() {
        let mut scrubber = Scrubber::new(bounds("2024-01-01T00:00:00Z", "2024-01-10T00:00:00Z"));
        scrubber.set_range(TimeRange::new(
            instant("2024-01-04T00:00:00Z"),
            instant("2024-01-06T00:00:00Z"),
        ));

        scrubber.jump_to_earliest();
        assert_eq!(scrubber.range().start(), instant("2024-01-01T00:00:00Z"));
        assert_eq!(scrubber.range().duration(), Duration::days(2));

        scrubber.jump_to_latest();
        assert_eq!(scrubber.range().end(), instant("2024-01-10T00:00:00Z"));
        assert_eq!(scrubber.range().duration(), Duration::days(2));
    }

    #[test]
    fn speed_is_clamped_and_sets_tick_interval() {
        let mut playback = PlaybackState::default();
        playback.set_speed(100.0);
        assert_eq!(playback.speed(), MAX_SPEED);
        playback.set_speed(0.0);
        assert_eq!(playback.speed(), MIN_SPEED);

        playback.set_speed(2.0);
        assert_eq!(playback.tick_interval(), std::time::Duration::from_millis(500));
    }

    #[test]
    fn set_bounds_clamps_selection() {
        let mut scrubber = Scrubber::new(bounds("2024-01-01T00:00:00Z", "2024-12-31T00:00:00Z"));
        scrubber.set_range(TimeRange::new(
            instant("2024-03-01T00:00:00Z"),
            instant("2024-09-01T00:00:00Z"),
        ));

        scrubber.set_bounds(bounds("2024-04-01T00:00:00Z", "2024-06-01T00:00:00Z"));
        assert_eq!(scrubber.range().start(), instant("2024-04-01T00:00:00Z"));
        assert_eq!(scrubber.range().end(), instant("2024-06-01T00:00:00Z"));
    }
}
