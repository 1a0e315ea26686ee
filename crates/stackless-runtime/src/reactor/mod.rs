//! Reactor interface and a single-threaded timer event loop
//!
//! The scheduler only needs one-shot timers: register a callback to run after
//! a duration, and stop it again. [`EventLoop`] provides that on top of a
//! [`Clock`], delivering fired callbacks on the thread that runs the loop.

mod clock;
mod event_loop;

pub use clock::{Clock, ManualClock, SystemClock};
pub use event_loop::EventLoop;

use crate::error::RuntimeError;
use std::fmt;
use std::time::Duration;

/// Identifier of a registered timer, unique per reactor
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Create a TimerId from a u64 value
    pub fn from_u64(id: u64) -> Self {
        TimerId(id)
    }

    /// Get the numeric ID value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Callback run when a timer fires.
///
/// An error returned here stops the reactor's run loop.
pub type TimerCallback = Box<dyn FnOnce(TimerId) -> Result<(), RuntimeError>>;

/// The timer interface the scheduler depends on
pub trait Reactor {
    /// Register a one-shot timer firing `after` from now
    fn start_timer(&self, after: Duration, callback: TimerCallback) -> TimerId;

    /// Stop a timer; returns false if it already fired or was stopped
    fn stop_timer(&self, id: TimerId) -> bool;

    /// Whether `id` is registered and has not fired yet
    fn is_armed(&self, id: TimerId) -> bool;

    /// Number of registered timers that have not fired yet
    fn pending_timers(&self) -> usize;
}
