//! Timer-backed sleep for task procedures

use super::task::{TaskContext, WakeSource};
use stackless_core::{resume_labels, Entry, Status};
use std::time::Duration;

resume_labels! {
    enum SleepAt { Waiting }
}

/// Suspend the calling task for `duration`.
///
/// A resumable procedure: await it like any other. The first invocation arms
/// the task's timer and suspends. Invocations not caused by that timer leave
/// it suspended. Once the timer fires it completes with `Ok`.
///
/// A task owns a single timer: sleeping while one is armed completes with
/// `Error` without suspending. Cancellation stops the timer and completes
/// with `Cancelled`.
pub fn sleep(ctx: &mut TaskContext, duration: Duration) -> Status {
    let frame = match ctx.enter::<SleepAt>() {
        Entry::Start(frame) => {
            if let Some(armed) = ctx.data().timer() {
                tracing::error!(task = %ctx.data().id(), timer = %armed, "task already has a timer armed");
                return ctx.exit(frame, Status::Error);
            }
            let timer = ctx.data_mut().arm(duration);
            tracing::trace!(task = %ctx.data().id(), %timer, ?duration, "sleeping");
            return ctx.suspend(frame, SleepAt::Waiting);
        }
        Entry::Resume(frame, SleepAt::Waiting) => frame,
        Entry::Cancelled(frame) => {
            ctx.data_mut().disarm();
            return ctx.exit(frame, Status::Cancelled);
        }
        Entry::Finished(status) => return status,
    };

    let link = ctx.data();
    match (link.timer(), link.woken_by()) {
        (Some(armed), Some(WakeSource::Timer(fired))) if armed == fired => {
            ctx.data_mut().disarm();
            ctx.exit(frame, Status::Ok)
        }
        (Some(_), _) => ctx.suspend(frame, SleepAt::Waiting),
        (None, _) => {
            tracing::error!(task = %link.id(), "sleep resumed without a timer");
            ctx.exit(frame, Status::Error)
        }
    }
}
