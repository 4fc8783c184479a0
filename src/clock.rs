//! Time sources for record timestamps and statistics windows.

use chrono::Utc;
use std::cell::Cell;

/// Supplies the current time in milliseconds since the Unix epoch.
pub trait Clock {
    /// Current time in epoch milliseconds.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock under test control.
///
/// Returns the current value and then advances it by `step` milliseconds, so
/// a non-zero step gives every save a distinct timestamp.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Cell<i64>,
    step: i64,
}

impl ManualClock {
    /// A clock frozen at `start` until moved with [`set`](Self::set) or
    /// [`advance`](Self::advance).
    pub fn new(start: i64) -> Self {
        Self::ticking(start, 0)
    }

    /// A clock starting at `start` that moves forward `step` ms per reading.
    pub fn ticking(start: i64, step: i64) -> Self {
        Self {
            now: Cell::new(start),
            step,
        }
    }

    /// Jumps to an absolute time.
    pub fn set(&self, millis: i64) {
        self.now.set(millis);
    }

    /// Moves the clock forward (or backward, for negative values).
    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }

    /// The value the next reading will return.
    pub fn peek(&self) -> i64 {
        self.now.get()
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}
