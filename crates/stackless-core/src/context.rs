//! Resumable context: the depth counter and frame slots shared by one call
//! hierarchy of resumable procedures.
//!
//! A procedure body follows the same shape everywhere:
//!
//! ```ignore
//! fn body(ctx: &mut Context, state: &mut State) -> Status {
//!     let (frame, at) = match ctx.enter::<At>() {
//!         Entry::Start(frame) => (frame, None),
//!         Entry::Resume(frame, at) => (frame, Some(at)),
//!         Entry::Cancelled(frame) => return ctx.exit(frame, Status::Cancelled),
//!         Entry::Finished(status) => return status,
//!     };
//!     // dispatch on `at`, suspend with `ctx.suspend(frame, At::X)`,
//!     // finish with `ctx.exit(frame, status)`
//! }
//! ```
//!
//! Nothing on the machine stack survives a suspension: every value needed
//! after a resume lives in the procedure's state struct or in
//! [`Context::data`].

use crate::defaults::MAX_DEPTH;
use crate::generator::Step;
use crate::label::{ResumeLabel, ResumePoint};
use crate::status::Status;

/// Contents of one frame slot
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Fresh frame: start at the top of the body
    Start,
    /// Suspended frame: continue at this marker
    Resume(ResumePoint),
    /// Suspended frame with a pending cancellation request
    Cancel,
    /// Terminal status of the frame that last occupied the slot
    Done(Status),
}

impl Slot {
    /// Status reported for this slot; anything not yet terminal is `Running`
    pub fn status(self) -> Status {
        match self {
            Slot::Done(status) => status,
            Slot::Start | Slot::Resume(_) | Slot::Cancel => Status::Running,
        }
    }
}

/// Token for an entered frame.
///
/// Only [`Context::enter`] hands these out; the depth it records is checked
/// again when the frame suspends or exits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    depth: usize,
}

impl Frame {
    /// Nesting level of this frame
    pub fn depth(self) -> usize {
        self.depth
    }
}

/// Where an entered procedure continues
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Entry<L> {
    /// First invocation of this frame
    Start(Frame),
    /// Resumed at a suspension point
    Resume(Frame, L),
    /// Cancellation was requested while this frame was suspended.
    ///
    /// Release resources, then exit with `Cancelled`.
    Cancelled(Frame),
    /// The frame could not run; return this status unchanged
    Finished(Status),
}

/// Outcome of awaiting a nested procedure
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Awaited {
    /// The child suspended and so did the awaiting frame; return `Running`
    Suspend,
    /// The awaiting frame must exit with this status
    Unwind(Status),
    /// The child finished; its status is for the awaiting frame to inspect
    Done(Status),
}

/// Persistent control-flow state of one call hierarchy
#[derive(Debug, Clone)]
pub struct Context<D = ()> {
    /// Depth of the running frame, `None` between invocations
    depth: Option<usize>,

    /// Number of live (running or suspended) frames
    live: usize,

    /// One slot per depth, plus a trailing slot that can only record the
    /// `StackOverflow` of a frame that could not be entered
    slots: [Slot; MAX_DEPTH + 1],

    /// Caller payload
    data: D,
}

impl<D: Default> Default for Context<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D> Context<D> {
    /// Create an idle context carrying `data`
    pub fn new(data: D) -> Self {
        Self {
            depth: None,
            live: 0,
            slots: [Slot::Start; MAX_DEPTH + 1],
            data,
        }
    }

    /// Forget every frame; the next invocation starts from scratch
    pub fn reset(&mut self) {
        self.depth = None;
        self.live = 0;
        self.slots = [Slot::Start; MAX_DEPTH + 1];
    }

    /// Abandon every frame and record `status` as the root outcome
    pub fn abort(&mut self, status: Status) {
        self.depth = None;
        self.live = 0;
        self.slots[0] = Slot::Done(status);
    }

    /// Caller payload
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Caller payload, mutably
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    /// Consume the context, returning the payload
    pub fn into_data(self) -> D {
        self.data
    }

    /// Depth of the running frame, `None` when no frame is running
    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// Number of live frames (deepest active depth + 1)
    pub fn live_frames(&self) -> usize {
        self.live
    }

    /// Contents of the slot at `depth`
    pub fn slot(&self, depth: usize) -> Option<Slot> {
        self.slots.get(depth).copied()
    }

    /// Status of the slot just below the running frame.
    ///
    /// Inside a body this is the last finished child; between invocations it
    /// is the root frame's status.
    pub fn status(&self) -> Status {
        self.slots[self.child_index()].status()
    }

    /// True while the root frame (or the last child) has not terminated
    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    /// True if the root frame (or the last child) ended cancelled
    pub fn is_cancelled(&self) -> bool {
        self.status().is_cancelled()
    }

    fn child_index(&self) -> usize {
        self.depth.map_or(0, |depth| depth + 1)
    }

    fn is_current(&self, frame: Frame) -> bool {
        self.depth == Some(frame.depth)
    }

    /// Enter a resumable procedure whose suspension points are `L`
    pub fn enter<L: ResumeLabel>(&mut self) -> Entry<L> {
        let depth = self.child_index();
        if depth >= MAX_DEPTH {
            tracing::error!(depth, "resumable stack overflow");
            self.slots[MAX_DEPTH] = Slot::Done(Status::StackOverflow);
            return Entry::Finished(Status::StackOverflow);
        }

        self.depth = Some(depth);
        self.live = self.live.max(depth + 1);
        let frame = Frame { depth };

        match self.slots[depth] {
            Slot::Start => Entry::Start(frame),
            Slot::Resume(point) => match L::from_point(point) {
                Some(label) => {
                    tracing::trace!(depth, marker = point.raw(), "resume");
                    Entry::Resume(frame, label)
                }
                None => {
                    tracing::error!(depth, marker = point.raw(), "unknown resume marker");
                    Entry::Finished(self.exit(frame, Status::RuntimeCorruption))
                }
            },
            Slot::Cancel => {
                tracing::trace!(depth, "cancellation observed");
                Entry::Cancelled(frame)
            }
            Slot::Done(status) => {
                self.depth = depth.checked_sub(1);
                self.live = depth;
                Entry::Finished(status)
            }
        }
    }

    /// Terminate `frame` with `status`, returning the status actually recorded
    pub fn exit(&mut self, frame: Frame, status: Status) -> Status {
        let status = if !self.is_current(frame) {
            tracing::error!(
                expected = frame.depth,
                found = ?self.depth,
                "frame exited at the wrong depth"
            );
            Status::InvalidDepth
        } else if status.is_running() {
            tracing::error!(depth = frame.depth, "frame exited with a non-terminal status");
            Status::Error
        } else {
            status
        };

        self.slots[frame.depth] = Slot::Done(status);
        self.depth = frame.depth.checked_sub(1);
        self.live = frame.depth;
        status
    }

    /// Record `label` as the frame's resume marker without suspending.
    ///
    /// Returns false, recording nothing, if `frame` is not the running frame.
    pub fn checkpoint<L: ResumeLabel>(&mut self, frame: Frame, label: L) -> bool {
        if !self.is_current(frame) {
            tracing::error!(
                expected = frame.depth,
                found = ?self.depth,
                "checkpoint of a frame that is not running"
            );
            return false;
        }
        self.slots[frame.depth] = Slot::Resume(label.point());
        true
    }

    /// Suspend `frame`, continuing at `label` on the next invocation
    pub fn suspend<L: ResumeLabel>(&mut self, frame: Frame, label: L) -> Status {
        if !self.is_current(frame) {
            return self.exit(frame, Status::InvalidDepth);
        }
        self.checkpoint(frame, label);
        self.depth = frame.depth.checked_sub(1);
        Status::Running
    }

    /// Suspend `frame` at `label`, handing `value` to the caller
    pub fn yield_value<L: ResumeLabel, T>(&mut self, frame: Frame, label: L, value: T) -> Step<T> {
        match self.suspend(frame, label) {
            Status::Running => Step::Yield(value),
            status => Step::Complete(status),
        }
    }

    /// Seed the slot of the procedure `frame` is about to await.
    ///
    /// Call on first arrival at an await point only: resuming the awaiting
    /// frame must skip this so the child's own marker survives.
    pub fn prime(&mut self, frame: Frame) {
        self.slots[frame.depth + 1] = Slot::Start;
    }

    /// Settle an await after invoking the child.
    ///
    /// `Running` suspends `frame` at `label`. `Cancelled` and protocol faults
    /// force the awaiting frame to unwind. Other statuses are returned to the
    /// body.
    pub fn settle<L: ResumeLabel>(&mut self, frame: Frame, label: L, child: Status) -> Awaited {
        match self.settle_catching(frame, label, child) {
            Awaited::Done(Status::Cancelled) => Awaited::Unwind(Status::Cancelled),
            awaited => awaited,
        }
    }

    /// Like [`settle`](Self::settle), but a cancelled child is reported as
    /// `Done(Cancelled)` instead of unwinding the awaiting frame.
    pub fn settle_catching<L: ResumeLabel>(
        &mut self,
        frame: Frame,
        label: L,
        child: Status,
    ) -> Awaited {
        if !self.is_current(frame) {
            tracing::error!(
                expected = frame.depth,
                found = ?self.depth,
                "awaited procedure returned at the wrong depth"
            );
            self.depth = Some(frame.depth);
            return Awaited::Unwind(Status::InvalidDepth);
        }

        match child {
            Status::Running => {
                self.suspend(frame, label);
                Awaited::Suspend
            }
            status if status.is_fault() => Awaited::Unwind(status),
            status => Awaited::Done(status),
        }
    }

    /// Request cooperative cancellation.
    ///
    /// Marks the deepest live frame; the request takes effect on the next
    /// invocation. A context that never ran is cancelled at its root, a
    /// finished one is left alone. Returns whether a request was recorded.
    pub fn cancel(&mut self) -> bool {
        if let Some(depth) = self.depth {
            tracing::warn!(depth, "cancel requested from inside a running frame");
        }

        match self.live.checked_sub(1) {
            Some(deepest) => {
                tracing::debug!(depth = deepest, "cancel requested");
                self.slots[deepest] = Slot::Cancel;
                true
            }
            None if self.slots[0] == Slot::Start => {
                tracing::debug!("cancel requested before first invocation");
                self.slots[0] = Slot::Cancel;
                true
            }
            None => false,
        }
    }
}

/// Settle an await inside a procedure returning [`Status`].
///
/// Returns `Running` from the enclosing function when the child suspended,
/// exits the frame and returns when it must unwind, and otherwise evaluates
/// to the child's terminal status.
///
/// Procedures with another return type pass a fifth argument mapping the
/// status to return (`Running` or the unwound frame's status) into it:
///
/// ```ignore
/// let n = settle!(ctx, frame, At::Child, child(ctx, state), |status| {
///     if status.is_running() { Step::Yield(None) } else { Step::Complete(status) }
/// });
/// ```
#[macro_export]
macro_rules! settle {
    ($ctx:expr, $frame:expr, $label:expr, $child:expr) => {{
        let child = $child;
        match $ctx.settle($frame, $label, child) {
            $crate::Awaited::Suspend => return $crate::Status::Running,
            $crate::Awaited::Unwind(status) => return $ctx.exit($frame, status),
            $crate::Awaited::Done(status) => status,
        }
    }};
    ($ctx:expr, $frame:expr, $label:expr, $child:expr, $returning:expr) => {{
        let child = $child;
        match $ctx.settle($frame, $label, child) {
            $crate::Awaited::Suspend => return ($returning)($crate::Status::Running),
            $crate::Awaited::Unwind(status) => return ($returning)($ctx.exit($frame, status)),
            $crate::Awaited::Done(status) => status,
        }
    }};
}
