// SPDX-License-Identifier: MIT

//!
//! The autoplay driver: a background task that ticks the scrubber forward
//! while playback is running and publishes each new range
//!

use crate::{Scrubber, TimeRange};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;

/// Owns the recurring playback tick.
///
/// One task runs for the driver's whole life.  While paused it parks on a
/// [`Notify`], so no timer exists at all; while playing it sleeps for the
/// current tick interval, steps the scrubber and publishes the new range.
/// Any parameter change (play/pause, speed, granularity, range, bounds) goes
/// through [`Autoplay::update`], which wakes the task so the pending sleep
/// is dropped and re-armed with the fresh interval.  Dropping the driver
/// aborts the task.
pub struct Autoplay {
    scrubber: Arc<Mutex<Scrubber>>,
    wake: Arc<Notify>,
    ranges: watch::Receiver<TimeRange>,
    task: JoinHandle<()>,
}

impl Autoplay {
    /// Spawn the driver over an initial scrubber state
    pub fn spawn(scrubber: Scrubber) -> Self {
        let (tx, ranges) = watch::channel(scrubber.range());
        let scrubber = Arc::new(Mutex::new(scrubber));
        let wake = Arc::new(Notify::new());
        let task = tokio::spawn(run(scrubber.clone(), wake.clone(), tx));
        Autoplay {
            scrubber,
            wake,
            ranges,
            task,
        }
    }

    /// A receiver of every range the driver publishes.  The receiver always
    /// holds the latest range; slow consumers skip intermediates rather
    /// than queueing them.
    pub fn ranges(&self) -> watch::Receiver<TimeRange> {
        self.ranges.clone()
    }

    /// Read the current scrubber state
    pub async fn state(&self) -> Scrubber {
        *self.scrubber.lock().await
    }

    /// Mutate the scrubber and wake the tick task.
    ///
    /// The wake drops any pending sleep, so a speed change re-arms the
    /// timer at the new interval immediately instead of after one stale
    /// tick, and a pause takes effect without waiting out the interval.
    pub async fn update<F, R>(&self, apply: F) -> R
    where
        F: FnOnce(&mut Scrubber) -> R,
    {
        let result = {
            let mut scrubber = self.scrubber.lock().await;
            apply(&mut scrubber)
        };
        self.wake.notify_one();
        result
    }
}

impl Drop for Autoplay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    scrubber: Arc<Mutex<Scrubber>>,
    wake: Arc<Notify>,
    tx: watch::Sender<TimeRange>,
) {
    loop {
        let (playing, interval) = {
            let scrubber = scrubber.lock().await;
            (
                scrubber.playback().is_playing(),
                scrubber.playback().tick_interval(),
            )
        };

        if !playing {
            // No timer while paused
            wake.notified().await;
            continue;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let mut scrubber = scrubber.lock().await;
                scrubber.tick();
                if tx.send(scrubber.range()).is_err() {
                    log::debug!("all range receivers dropped, autoplay going quiet");
                }
            }
            _ = wake.notified() => {
                // Parameters changed; loop re-reads them and re-arms
            }
        }
    }
}
