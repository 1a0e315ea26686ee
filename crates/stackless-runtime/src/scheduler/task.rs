//! Task structure and execution state

use crate::error::{RuntimeError, RuntimeResult};
use crate::reactor::{Reactor, TimerId};
use crate::scheduler::SchedulerStats;
use stackless_core::{Context, Status};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Unique identifier for a Task
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

impl TaskId {
    /// Generate a new unique TaskId
    pub fn new() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric ID value
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Create a TaskId from a u64 value
    pub fn from_u64(id: u64) -> Self {
        TaskId(id)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Observable state of a Task
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Its body is executing right now
    Running,
    /// Waiting to be driven again
    Suspended,
    /// Finished on its own
    Completed,
    /// Finished by cancellation
    Cancelled,
    /// Terminated by a protocol fault
    Faulted,
}

/// The event source that drove a task most recently
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WakeSource {
    /// A reactor timer fired
    Timer(TimerId),
    /// The owner drove the task directly
    Manual,
}

/// Context type of task procedures
pub type TaskContext = Context<TaskLink>;

/// Signature of a task body.
///
/// The argument is the task's state struct: it is the only storage that
/// survives a suspension, so every value needed after a `sleep` or any other
/// await must live there. Plain function pointers keep bodies from capturing
/// anything else.
pub type TaskFn<A> = fn(&mut TaskContext, &mut A) -> Status;

/// Scheduler-private fields carried in a task's context
pub struct TaskLink {
    /// Owning task
    id: TaskId,
    /// Owning task's name
    name: Rc<str>,
    /// Reactor providing timers
    reactor: Rc<dyn Reactor>,
    /// Back reference used by timer callbacks
    this: Weak<RefCell<Task>>,
    /// The task's single timer slot
    timer: Option<TimerId>,
    /// Source of the most recent drive
    woken_by: Option<WakeSource>,
}

impl TaskLink {
    /// Owning task's id
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Owning task's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reactor the task is scheduled on
    pub fn reactor(&self) -> &Rc<dyn Reactor> {
        &self.reactor
    }

    /// Timer currently registered for this task
    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Source of the most recent drive
    pub fn woken_by(&self) -> Option<WakeSource> {
        self.woken_by
    }

    /// Register the task's timer; firing it drives the task
    pub(crate) fn arm(&mut self, after: Duration) -> TimerId {
        let id = self.id;
        let name = Rc::clone(&self.name);
        let task = self.this.clone();

        let timer = self.reactor.start_timer(
            after,
            Box::new(move |fired| match task.upgrade() {
                Some(task) => {
                    drive_cell(id, &name, &task, Some(WakeSource::Timer(fired))).map(|_| ())
                }
                None => Ok(()),
            }),
        );
        self.timer = Some(timer);
        timer
    }

    /// Stop and forget the task's timer, if any
    pub(crate) fn disarm(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => self.reactor.stop_timer(timer),
            None => false,
        }
    }
}

/// A resumable procedure plus its scheduler bookkeeping
pub(crate) struct Task {
    /// Frame slots, depth and scheduler-private fields
    ctx: TaskContext,
    /// Procedure bound to its argument
    body: Box<dyn FnMut(&mut TaskContext) -> Status>,
    /// True once the root frame terminated
    done: bool,
    /// Value returned by the most recent invocation
    return_code: Status,
    /// Number of invocations so far
    drives: u64,
    /// Counters shared with the scheduler
    stats: Rc<RefCell<SchedulerStats>>,
}

impl Task {
    fn id(&self) -> TaskId {
        self.ctx.data().id
    }

    /// Invoke the procedure once, unless it already finished
    fn run(&mut self, source: Option<WakeSource>) -> RuntimeResult<Status> {
        if self.done {
            return Ok(self.return_code);
        }

        if let Some(source) = source {
            self.ctx.data_mut().woken_by = Some(source);
        }
        self.drives += 1;
        tracing::trace!(task = %self.id(), ?source, drive = self.drives, "drive");

        let status = (self.body)(&mut self.ctx);

        if let Some(depth) = self.ctx.depth() {
            tracing::error!(task = %self.id(), depth, "procedure returned without leaving its frame");
            self.ctx.abort(Status::InvalidDepth);
        }

        self.return_code = status;
        self.done = !self.ctx.is_running();
        if self.done {
            self.finish()
        } else {
            Ok(status)
        }
    }

    /// Request cancellation and drive once so the frames unwind
    fn cancel(&mut self) -> RuntimeResult<Status> {
        if self.done {
            return Ok(self.return_code);
        }

        self.ctx.cancel();
        let status = self.run(None)?;
        if !self.done {
            tracing::warn!(task = %self.id(), "task ignored cancellation, abandoning its frames");
            self.ctx.abort(Status::Cancelled);
            self.return_code = Status::Cancelled;
            self.done = true;
            return self.finish();
        }
        Ok(status)
    }

    /// Release resources and account for a finished task
    fn finish(&mut self) -> RuntimeResult<Status> {
        self.ctx.data_mut().disarm();

        let outcome = self.ctx.status();
        let fault = outcome.fault().or_else(|| self.return_code.fault());
        {
            let mut stats = self.stats.borrow_mut();
            stats.active_tasks = stats.active_tasks.saturating_sub(1);
            match fault {
                Some(_) => stats.tasks_faulted += 1,
                None if outcome.is_cancelled() => stats.tasks_cancelled += 1,
                None => stats.tasks_completed += 1,
            }
        }

        let link = self.ctx.data();
        match fault {
            Some(source) => {
                tracing::error!(task = %link.id, name = %link.name, %source, "task faulted");
                Err(RuntimeError::Fault {
                    id: link.id,
                    name: link.name.to_string(),
                    source,
                })
            }
            None => {
                tracing::debug!(
                    task = %link.id,
                    name = %link.name,
                    %outcome,
                    return_code = %self.return_code,
                    "task finished"
                );
                Ok(self.return_code)
            }
        }
    }

    fn state(&self) -> TaskState {
        if !self.done {
            return TaskState::Suspended;
        }
        match self.ctx.status() {
            status if status.is_fault() || self.return_code.is_fault() => TaskState::Faulted,
            Status::Cancelled => TaskState::Cancelled,
            _ => TaskState::Completed,
        }
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if self.done {
            return;
        }

        // Abandoned while suspended
        self.ctx.data_mut().disarm();
        if let Ok(mut stats) = self.stats.try_borrow_mut() {
            stats.active_tasks = stats.active_tasks.saturating_sub(1);
            stats.tasks_cancelled += 1;
        }
        tracing::debug!(task = %self.id(), name = %self.ctx.data().name, "task abandoned");
    }
}

/// Drive a shared task, rejecting re-entrant invocation
fn drive_cell(
    id: TaskId,
    name: &str,
    task: &RefCell<Task>,
    source: Option<WakeSource>,
) -> RuntimeResult<Status> {
    let mut task = task.try_borrow_mut().map_err(|_| RuntimeError::Reentrant {
        id,
        name: name.to_string(),
    })?;
    task.run(source)
}

/// Handle to a started task.
///
/// Handles are cheap to clone; the task lives as long as any handle does.
/// Timer callbacks only hold weak references, so dropping every handle
/// abandons the task: its timer is stopped and it no longer counts as
/// active.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    name: Rc<str>,
    task: Rc<RefCell<Task>>,
}

impl TaskHandle {
    /// Create a task bound to `procedure(arg)`; it has not run yet
    pub(crate) fn new<A: 'static>(
        name: &str,
        reactor: Rc<dyn Reactor>,
        stats: Rc<RefCell<SchedulerStats>>,
        procedure: TaskFn<A>,
        mut arg: A,
    ) -> Self {
        let id = TaskId::new();
        let name: Rc<str> = Rc::from(name);

        let link_name = Rc::clone(&name);
        let task = Rc::new_cyclic(move |this: &Weak<RefCell<Task>>| {
            RefCell::new(Task {
                ctx: Context::new(TaskLink {
                    id,
                    name: link_name,
                    reactor,
                    this: this.clone(),
                    timer: None,
                    woken_by: None,
                }),
                body: Box::new(move |ctx: &mut TaskContext| procedure(ctx, &mut arg)),
                done: false,
                return_code: Status::Running,
                drives: 0,
                stats,
            })
        });

        Self { id, name, task }
    }

    /// First invocation, performed by the scheduler
    pub(crate) fn run_first(&self) -> RuntimeResult<Status> {
        drive_cell(self.id, &self.name, &self.task, None)
    }

    /// Get the Task's unique ID
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Get the Task's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Re-invoke the procedure after an event from `source`.
    ///
    /// No-op returning the final status if the task is done.
    pub fn drive(&self, source: WakeSource) -> RuntimeResult<Status> {
        drive_cell(self.id, &self.name, &self.task, Some(source))
    }

    /// Cancel the task and drive it once so it unwinds.
    ///
    /// On return the task is done and its timer is stopped.
    pub fn cancel(&self) -> RuntimeResult<Status> {
        let mut task = self
            .task
            .try_borrow_mut()
            .map_err(|_| RuntimeError::Reentrant {
                id: self.id,
                name: self.name.to_string(),
            })?;
        tracing::debug!(task = %self.id, name = %self.name, "cancel");
        task.cancel()
    }

    /// Whether the root frame has terminated
    pub fn is_done(&self) -> bool {
        self.task.try_borrow().is_ok_and(|task| task.done)
    }

    /// Value returned by the most recent invocation (`Running` while running)
    pub fn return_code(&self) -> Status {
        self.task
            .try_borrow()
            .map_or(Status::Running, |task| task.return_code)
    }

    /// Terminal status of the root frame, `Running` until it finishes
    pub fn outcome(&self) -> Status {
        self.task
            .try_borrow()
            .map_or(Status::Running, |task| task.ctx.status())
    }

    /// Current state
    pub fn state(&self) -> TaskState {
        self.task
            .try_borrow()
            .map_or(TaskState::Running, |task| task.state())
    }

    /// Number of invocations so far
    pub fn drives(&self) -> u64 {
        self.task.try_borrow().map_or(0, |task| task.drives)
    }

    /// Timer currently registered for the task
    pub fn timer(&self) -> Option<TimerId> {
        self.task
            .try_borrow()
            .ok()
            .and_then(|task| task.ctx.data().timer)
    }

    /// Source of the most recent drive
    pub fn woken_by(&self) -> Option<WakeSource> {
        self.task
            .try_borrow()
            .ok()
            .and_then(|task| task.ctx.data().woken_by)
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}
