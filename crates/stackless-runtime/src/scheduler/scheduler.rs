use super::task::{TaskFn, TaskHandle};
use crate::defaults::RESTRICTED_MAX_TASKS;
use crate::error::{RuntimeError, RuntimeResult};
use crate::reactor::Reactor;
use std::cell::RefCell;
use std::rc::Rc;

/// Scheduler statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Total tasks started
    pub tasks_started: u64,

    /// Tasks whose root frame finished on its own
    pub tasks_completed: u64,

    /// Tasks that ended cancelled or were dropped unfinished
    pub tasks_cancelled: u64,

    /// Tasks terminated by a protocol fault
    pub tasks_faulted: u64,

    /// Currently active tasks
    pub active_tasks: usize,
}

/// Resource limits for a scheduler
#[derive(Debug, Clone, Default)]
pub struct SchedulerLimits {
    /// Maximum concurrently active tasks (None = unlimited)
    pub max_concurrent_tasks: Option<usize>,
}

impl SchedulerLimits {
    /// Limits for a constrained embedding
    pub fn restricted() -> Self {
        Self {
            max_concurrent_tasks: Some(RESTRICTED_MAX_TASKS),
        }
    }
}

/// Cooperative task scheduler.
///
/// Starting a task runs its first invocation synchronously. After that the
/// task only runs when something drives it: a reactor timer armed by
/// [`sleep`](super::sleep), or its owner through [`TaskHandle`].
pub struct Scheduler {
    /// Event source for timers
    reactor: Rc<dyn Reactor>,

    /// Resource limits
    limits: SchedulerLimits,

    /// Counters shared with every task
    stats: Rc<RefCell<SchedulerStats>>,
}

impl Scheduler {
    /// Create a scheduler on `reactor`
    pub fn new(reactor: Rc<dyn Reactor>) -> Self {
        Self::with_limits(reactor, SchedulerLimits::default())
    }

    /// Create a scheduler with resource limits
    pub fn with_limits(reactor: Rc<dyn Reactor>, limits: SchedulerLimits) -> Self {
        Self {
            reactor,
            limits,
            stats: Rc::new(RefCell::new(SchedulerStats::default())),
        }
    }

    /// Start a task running `procedure(arg)`.
    ///
    /// The first invocation happens before this returns. Fails with
    /// [`RuntimeError::LimitReached`] when the active task limit is reached,
    /// or with [`RuntimeError::Fault`] when that first invocation faults.
    pub fn start<A: 'static>(
        &self,
        name: &str,
        procedure: TaskFn<A>,
        arg: A,
    ) -> RuntimeResult<TaskHandle> {
        {
            let mut stats = self.stats.borrow_mut();
            if let Some(limit) = self.limits.max_concurrent_tasks {
                if stats.active_tasks >= limit {
                    tracing::warn!(name, limit, "task limit reached");
                    return Err(RuntimeError::LimitReached { limit });
                }
            }
            stats.tasks_started += 1;
            stats.active_tasks += 1;
        }

        let handle = TaskHandle::new(
            name,
            Rc::clone(&self.reactor),
            Rc::clone(&self.stats),
            procedure,
            arg,
        );
        tracing::debug!(task = %handle.id(), name, "task started");

        handle.run_first()?;
        Ok(handle)
    }

    /// Get scheduler statistics
    pub fn stats(&self) -> SchedulerStats {
        self.stats.borrow().clone()
    }

    /// Number of tasks started and not yet finished
    pub fn active_tasks(&self) -> usize {
        self.stats.borrow().active_tasks
    }

    /// Get resource limits
    pub fn limits(&self) -> &SchedulerLimits {
        &self.limits
    }

    /// Reactor the scheduler arms timers on
    pub fn reactor(&self) -> &Rc<dyn Reactor> {
        &self.reactor
    }
}
