//! Fixed-interval refresh timer driven by the UI loop
//!
//! egui has no timer callbacks; the update loop asks the timer whether a
//! tick is due and how long it may sleep before the next one. Ticks never
//! overlap: a slow tick simply pushes the next deadline back.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RefreshTimer {
    interval: Duration,
    next_due: Instant,
}

impl RefreshTimer {
    /// Start a timer whose first tick is due `interval` after `now`
    pub fn start(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// Restart with a new cadence, counting from `now`
    pub fn restart(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        self.next_due = now + interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Consume a due tick. The next deadline is scheduled from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }

    /// Time until the next tick (zero if overdue)
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}
