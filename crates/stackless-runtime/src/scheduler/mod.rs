//! Cooperative task scheduler
//!
//! A task is a resumable procedure bound to its argument. The scheduler runs
//! its first invocation when it starts; afterwards the task is driven by the
//! reactor timer armed in [`sleep`] or directly by its owner.

#[allow(clippy::module_inception)]
mod scheduler;
mod sleep;
mod task;

pub use scheduler::{Scheduler, SchedulerLimits, SchedulerStats};
pub use sleep::sleep;
pub use task::{TaskContext, TaskFn, TaskHandle, TaskId, TaskLink, TaskState, WakeSource};
