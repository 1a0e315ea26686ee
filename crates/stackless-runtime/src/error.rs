//! Runtime error types

use crate::scheduler::TaskId;
use stackless_core::ProtocolError;

/// Errors surfaced by the scheduler and the event loop
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A task broke a protocol invariant and was terminated
    #[error("task '{name}' ({id}) faulted: {source}")]
    Fault {
        /// Faulted task
        id: TaskId,
        /// Task name
        name: String,
        /// Broken invariant
        #[source]
        source: ProtocolError,
    },

    /// A task was driven while it was already running
    #[error("task '{name}' ({id}) is already running")]
    Reentrant {
        /// Task being driven
        id: TaskId,
        /// Task name
        name: String,
    },

    /// The scheduler refused to start another task
    #[error("task limit reached ({limit} active tasks)")]
    LimitReached {
        /// Configured limit
        limit: usize,
    },
}

/// Result type of scheduler operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
