//! Single-threaded timer loop
//!
//! Timers live in a min-heap ordered by deadline, with the timer id breaking
//! ties so equal deadlines fire in registration order. Stopping a timer
//! drops its callback; the stale heap entry is skipped when it surfaces, and
//! the heap is purged once stale entries outnumber armed ones.

use super::{Clock, Reactor, SystemClock, TimerCallback, TimerId};
use crate::error::RuntimeError;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Entry in the timer heap
struct TimerEntry {
    /// When the timer fires
    deadline: Instant,
    /// Timer to fire
    id: TimerId,
}

// Reverse ordering for min-heap (earliest deadline, then lowest id, first)
impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Eq for TimerEntry {}

/// Timer state behind the loop's `RefCell`
#[derive(Default)]
struct TimerQueue {
    /// Pending deadlines (may contain stopped timers)
    heap: BinaryHeap<TimerEntry>,
    /// Callbacks of armed timers
    callbacks: FxHashMap<TimerId, TimerCallback>,
    /// Next timer id
    next_id: u64,
    /// Timers fired so far
    fired: u64,
}

impl TimerQueue {
    /// Pop the next armed timer, discarding stopped ones
    fn pop_armed(&mut self) -> Option<(Instant, TimerId, TimerCallback)> {
        while let Some(entry) = self.heap.pop() {
            if let Some(callback) = self.callbacks.remove(&entry.id) {
                return Some((entry.deadline, entry.id, callback));
            }
        }
        None
    }

    /// Forget the callback of `id`
    fn stop(&mut self, id: TimerId) -> bool {
        if self.callbacks.remove(&id).is_none() {
            return false;
        }
        if self.heap.len() > 2 * self.callbacks.len() {
            let callbacks = &self.callbacks;
            self.heap.retain(|entry| callbacks.contains_key(&entry.id));
        }
        true
    }
}

/// Event loop delivering timer callbacks on the calling thread.
///
/// No borrow of the timer queue is held while a callback runs, so callbacks
/// may start and stop timers freely.
pub struct EventLoop<C: Clock = SystemClock> {
    clock: C,
    timers: RefCell<TimerQueue>,
}

impl EventLoop<SystemClock> {
    /// Create a loop driven by the wall clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for EventLoop<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> EventLoop<C> {
    /// Create a loop driven by `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            timers: RefCell::new(TimerQueue::default()),
        }
    }

    /// The loop's clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Number of timers fired since creation
    pub fn fired_timers(&self) -> u64 {
        self.timers.borrow().fired
    }

    /// Wait for the next armed timer and run its callback.
    ///
    /// Returns `Ok(false)` once no timer is armed.
    pub fn turn(&self) -> Result<bool, RuntimeError> {
        let next = self.timers.borrow_mut().pop_armed();
        let Some((deadline, id, callback)) = next else {
            return Ok(false);
        };

        self.clock.sleep_until(deadline);
        self.timers.borrow_mut().fired += 1;
        tracing::trace!(timer = %id, "timer fired");
        callback(id)?;
        Ok(true)
    }

    /// Run until no timer is armed.
    ///
    /// Stops at the first callback error. Returns the number of timers fired.
    pub fn run(&self) -> Result<u64, RuntimeError> {
        let mut fired = 0;
        while self.turn()? {
            fired += 1;
        }
        tracing::debug!(fired, "event loop idle");
        Ok(fired)
    }
}

impl<C: Clock> Reactor for EventLoop<C> {
    fn start_timer(&self, after: Duration, callback: TimerCallback) -> TimerId {
        let deadline = self.clock.now() + after;
        let mut timers = self.timers.borrow_mut();
        let id = TimerId::from_u64(timers.next_id);
        timers.next_id += 1;
        timers.heap.push(TimerEntry { deadline, id });
        timers.callbacks.insert(id, callback);
        tracing::trace!(timer = %id, ?after, "timer started");
        id
    }

    fn stop_timer(&self, id: TimerId) -> bool {
        let stopped = self.timers.borrow_mut().stop(id);
        if stopped {
            tracing::trace!(timer = %id, "timer stopped");
        }
        stopped
    }

    fn is_armed(&self, id: TimerId) -> bool {
        self.timers.borrow().callbacks.contains_key(&id)
    }

    fn pending_timers(&self) -> usize {
        self.timers.borrow().callbacks.len()
    }
}
