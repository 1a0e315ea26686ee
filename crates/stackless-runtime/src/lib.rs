//! Single-threaded runtime for resumable procedures
//!
//! Tasks run on a [`Scheduler`] and suspend on timers armed with a
//! [`Reactor`]. [`EventLoop`] is the bundled reactor; pair it with
//! [`ManualClock`] for deterministic tests.
//!
//! ```ignore
//! use stackless_runtime::{sleep, EventLoop, Scheduler};
//!
//! let reactor = Rc::new(EventLoop::new());
//! let scheduler = Scheduler::new(reactor.clone());
//! let task = scheduler.start("worker", worker, WorkerState::default())?;
//! reactor.run()?;
//! assert!(task.is_done());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod defaults;
pub mod error;
pub mod reactor;
pub mod scheduler;

pub use error::{RuntimeError, RuntimeResult};
pub use reactor::{Clock, EventLoop, ManualClock, Reactor, SystemClock, TimerCallback, TimerId};
pub use scheduler::{
    sleep, Scheduler, SchedulerLimits, SchedulerStats, TaskContext, TaskFn, TaskHandle, TaskId,
    TaskLink, TaskState, WakeSource,
};
