//! Two sleeping tasks
//!
//! Each task naps for a fixed interval a number of times. The one with fewer
//! iterations finishes first and cancels the other mid-nap.

use stackless_core::{resume_labels, settle, Entry, Status};
use stackless_runtime::{sleep, RuntimeResult, Scheduler, TaskContext, TaskHandle};
use std::time::Duration;

resume_labels! {
    enum SleeperAt { Napping }
}

/// State of one sleeping task
#[derive(Debug)]
pub struct Sleeper {
    name: String,
    iterations: u32,
    interval: Duration,
    iteration: u32,
    napping: bool,
    cancels: Option<TaskHandle>,
    code: i32,
}

impl Sleeper {
    /// Nap `iterations` times for `interval`, then return `App(code)`
    pub fn new(name: &str, iterations: u32, interval: Duration, code: i32) -> Self {
        Self {
            name: name.to_string(),
            iterations,
            interval,
            iteration: 0,
            napping: false,
            cancels: None,
            code,
        }
    }

    /// Cancel `target` once done napping
    pub fn cancelling(mut self, target: TaskHandle) -> Self {
        self.cancels = Some(target);
        self
    }
}

/// Settings of the two-task scenario
#[derive(Debug, Clone)]
pub struct SleepersConfig {
    /// Length of each nap
    pub interval: Duration,
    /// Naps taken by the task that cancels
    pub watcher_iterations: u32,
    /// Naps planned by the task that gets cancelled
    pub victim_iterations: u32,
}

impl Default for SleepersConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            watcher_iterations: 3,
            victim_iterations: 10,
        }
    }
}

fn naps(ctx: &mut TaskContext, s: &mut Sleeper) -> Status {
    let frame = match ctx.enter::<SleeperAt>() {
        Entry::Start(frame) | Entry::Resume(frame, SleeperAt::Napping) => frame,
        Entry::Cancelled(frame) => return ctx.exit(frame, Status::Cancelled),
        Entry::Finished(status) => return status,
    };

    loop {
        if !s.napping {
            if s.iteration == s.iterations {
                return ctx.exit(frame, Status::Ok);
            }
            tracing::info!("{} = {}", s.name, s.iteration);
            ctx.prime(frame);
            s.napping = true;
        }
        settle!(ctx, frame, SleeperAt::Napping, sleep(ctx, s.interval));
        s.napping = false;
        s.iteration += 1;
    }
}

/// Task body: nap, report how it ended, cancel the target if any
pub fn sleeper(ctx: &mut TaskContext, s: &mut Sleeper) -> Status {
    let outcome = naps(ctx, s);
    if outcome.is_running() {
        return outcome;
    }

    if outcome.is_cancelled() {
        tracing::info!("{} was cancelled", s.name);
    } else {
        tracing::info!("{} ended: {}", s.name, outcome);
    }

    if let Some(target) = s.cancels.take() {
        tracing::info!("{} will cancel {} now", s.name, target.name());
        if let Err(err) = target.cancel() {
            tracing::error!(%err, "cancellation failed");
        }
    }
    Status::App(s.code)
}

/// Start the victim, then the watcher that cancels it.
///
/// Returns `(watcher, victim)`. Both are suspended on their first nap; run
/// the scheduler's reactor to play the scenario out.
pub fn start_pair(
    scheduler: &Scheduler,
    config: &SleepersConfig,
) -> RuntimeResult<(TaskHandle, TaskHandle)> {
    let victim = scheduler.start(
        "B",
        sleeper,
        Sleeper::new("B", config.victim_iterations, config.interval, 2),
    )?;
    let watcher = scheduler.start(
        "A",
        sleeper,
        Sleeper::new("A", config.watcher_iterations, config.interval, 1).cancelling(victim.clone()),
    )?;
    Ok((watcher, victim))
}
