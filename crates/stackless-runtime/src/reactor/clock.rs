//! Time sources for the event loop

use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

/// Source of time for an [`EventLoop`](super::EventLoop)
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;

    /// Block until `deadline` has passed
    fn sleep_until(&self, deadline: Instant);
}

/// Wall clock: sleeps the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
    }
}

/// Virtual clock: sleeping jumps straight to the deadline.
///
/// Time only moves when the loop waits for a timer or when
/// [`advance`](ManualClock::advance) is called, which makes timer-driven
/// schedules deterministic and instant in tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    now: Cell<Instant>,
}

impl ManualClock {
    /// Create a clock starting at the current instant
    pub fn new() -> Self {
        let origin = Instant::now();
        Self {
            origin,
            now: Cell::new(origin),
        }
    }

    /// Move time forward by `by`
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Virtual time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.now.get() - self.origin
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep_until(&self, deadline: Instant) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}
