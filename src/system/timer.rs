//! Redraw timer
//!
//! The face owns a single self-scheduled message: the periodic redraw. The
//! host provides the actual timer through [`Scheduler`]; this module decides
//! when it runs and how long to wait.

use embassy_time::Duration;

/// Host timer carrying the periodic redraw message.
///
/// At most one redraw is ever pending. `schedule_redraw` is only called
/// after `cancel_redraw`, so an implementation may simply overwrite its
/// pending deadline.
pub trait Scheduler {
    /// Drop the pending redraw, if any
    fn cancel_redraw(&mut self);

    /// Post a redraw to fire after `delay`
    fn schedule_redraw(&mut self, delay: Duration);
}

/// Delay until the next multiple of `interval` since the epoch.
///
/// Always in `(0, interval]`, so ticks land on round wall-clock boundaries.
pub fn aligned_delay(now_epoch_ms: i64, interval: Duration) -> Duration {
    let interval_ms = interval.as_millis().max(1) as i64;
    let elapsed = now_epoch_ms.rem_euclid(interval_ms);
    Duration::from_millis((interval_ms - elapsed) as u64)
}

/// Cadence of the periodic redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RedrawTimer {
    /// Interval used while the timer runs
    interval: Duration,
}

impl RedrawTimer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the interval. Returns whether it changed.
    pub fn set_interval(&mut self, interval: Duration) -> bool {
        if interval == self.interval {
            return false;
        }
        self.interval = interval;
        true
    }

    /// Cancel the pending redraw and, if `running`, post the next one aligned
    /// to the interval boundary.
    pub fn rearm<S: Scheduler>(&self, scheduler: &mut S, running: bool, now_epoch_ms: i64) {
        scheduler.cancel_redraw();
        if running {
            let delay = aligned_delay(now_epoch_ms, self.interval);
            trace!("redraw scheduled in {} ms", delay.as_millis());
            scheduler.schedule_redraw(delay);
        }
    }

    /// Stop the timer for good
    pub fn cancel<S: Scheduler>(&self, scheduler: &mut S) {
        scheduler.cancel_redraw();
    }
}
