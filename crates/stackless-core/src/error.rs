//! Protocol invariant violations

/// A broken protocol invariant.
///
/// These are programming errors, not runtime conditions: the frame that hits
/// one terminates with the matching [`Status`](crate::Status) and the fault
/// is propagated through every enclosing await.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Await nesting exceeded the slot array
    #[error("resumable stack overflow (max depth {})", crate::MAX_DEPTH)]
    StackOverflow,

    /// A frame returned from inside its body without exiting
    #[error("frame exited at the wrong depth")]
    InvalidDepth,

    /// A frame was resumed at a marker it does not define
    #[error("invalid resume marker")]
    RuntimeCorruption,
}
