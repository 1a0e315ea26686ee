//! Pull-based value production on top of the resumable protocol

use crate::context::Context;
use crate::status::Status;

/// Result of one invocation of a value-producing procedure
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// Suspended after producing a value
    Yield(T),
    /// Terminated; no further values
    Complete(Status),
}

impl<T> Step<T> {
    /// The produced value, if any
    pub fn value(self) -> Option<T> {
        match self {
            Step::Yield(value) => Some(value),
            Step::Complete(_) => None,
        }
    }

    /// Status of this step: `Running` for a yield
    pub fn status(&self) -> Status {
        match self {
            Step::Yield(_) => Status::Running,
            Step::Complete(status) => *status,
        }
    }
}

/// Body of a generator: produces one step per invocation
pub type GeneratorFn<S, T> = fn(&mut Context, &mut S) -> Step<T>;

/// A lazily evaluated, possibly infinite sequence.
///
/// Each call to [`resume`](Generator::resume) drives the body once. The state
/// struct `S` holds everything the body needs across yields. Once the body
/// terminates the generator keeps returning that status until
/// [`restart`](Generator::restart) reinitialises the context.
pub struct Generator<S, T> {
    ctx: Context,
    state: S,
    body: GeneratorFn<S, T>,
    outcome: Option<Status>,
}

impl<S, T> Generator<S, T> {
    /// Create a generator; the body does not run until the first resume
    pub fn new(body: GeneratorFn<S, T>, state: S) -> Self {
        Self {
            ctx: Context::default(),
            state,
            body,
            outcome: None,
        }
    }

    /// Drive the body once
    pub fn resume(&mut self) -> Step<T> {
        if let Some(status) = self.outcome {
            return Step::Complete(status);
        }

        let step = (self.body)(&mut self.ctx, &mut self.state);
        if let Step::Complete(status) = step {
            self.outcome = Some(status);
        }
        step
    }

    /// Request cancellation; the next resume completes with `Cancelled`
    pub fn cancel(&mut self) -> bool {
        self.outcome.is_none() && self.ctx.cancel()
    }

    /// Terminal status, once the body has finished
    pub fn outcome(&self) -> Option<Status> {
        self.outcome
    }

    /// Start over with a new state
    pub fn restart(&mut self, state: S) {
        self.ctx.reset();
        self.state = state;
        self.outcome = None;
    }

    /// Current state
    pub fn state(&self) -> &S {
        &self.state
    }
}

impl<S, T> Iterator for Generator<S, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.resume().value()
    }
}
