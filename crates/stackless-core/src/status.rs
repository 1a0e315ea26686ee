//! Status codes returned by resumable procedures

use crate::error::ProtocolError;
use std::fmt;

/// Outcome of one invocation of a resumable procedure.
///
/// `Running` is the only non-terminal value: the procedure suspended and must
/// be invoked again. Every other variant is terminal for the frame that
/// produced it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Terminated successfully
    #[default]
    Ok,
    /// Suspended, call again
    Running,
    /// General error
    Error,
    /// Terminated by cooperative cancellation
    Cancelled,
    /// Await nesting exceeded the slot array
    StackOverflow,
    /// A frame exited at a depth other than the one it entered at
    InvalidDepth,
    /// Dispatch to a resume marker the procedure does not know
    RuntimeCorruption,
    /// Application-defined code, opaque to the protocol
    App(i32),
}

impl Status {
    /// Reserved code of `Ok`
    pub const CODE_OK: i32 = 0;
    /// Reserved code of `Error`
    pub const CODE_ERROR: i32 = Self::CODE_OK - 1;
    /// Reserved code of `Cancelled`
    pub const CODE_CANCELLED: i32 = Self::CODE_OK - 2;
    /// Reserved code of `StackOverflow`
    pub const CODE_STACK_OVERFLOW: i32 = Self::CODE_OK - 3;
    /// Reserved code of `InvalidDepth`
    pub const CODE_INVALID_DEPTH: i32 = Self::CODE_OK - 4;
    /// Reserved code of `RuntimeCorruption`
    pub const CODE_RUNTIME_CORRUPTION: i32 = Self::CODE_OK - 5;

    /// True for every status except `Running`
    pub fn is_terminal(self) -> bool {
        self != Status::Running
    }

    /// True for `Running`
    pub fn is_running(self) -> bool {
        self == Status::Running
    }

    /// True for `Cancelled`
    pub fn is_cancelled(self) -> bool {
        self == Status::Cancelled
    }

    /// True for the statuses that signal a broken protocol invariant.
    ///
    /// Faults are never retried: they terminate the task that produced them.
    pub fn is_fault(self) -> bool {
        matches!(
            self,
            Status::StackOverflow | Status::InvalidDepth | Status::RuntimeCorruption
        )
    }

    /// Convert a fault status into the matching error, `None` otherwise
    pub fn fault(self) -> Option<ProtocolError> {
        match self {
            Status::StackOverflow => Some(ProtocolError::StackOverflow),
            Status::InvalidDepth => Some(ProtocolError::InvalidDepth),
            Status::RuntimeCorruption => Some(ProtocolError::RuntimeCorruption),
            _ => None,
        }
    }

    /// Integer code of a terminal status.
    ///
    /// Reserved protocol codes are zero or negative; application codes are
    /// passed through. `Running` has no code.
    pub fn code(self) -> Option<i32> {
        match self {
            Status::Ok => Some(Self::CODE_OK),
            Status::Running => None,
            Status::Error => Some(Self::CODE_ERROR),
            Status::Cancelled => Some(Self::CODE_CANCELLED),
            Status::StackOverflow => Some(Self::CODE_STACK_OVERFLOW),
            Status::InvalidDepth => Some(Self::CODE_INVALID_DEPTH),
            Status::RuntimeCorruption => Some(Self::CODE_RUNTIME_CORRUPTION),
            Status::App(code) => Some(code),
        }
    }

    /// Map an integer code back to a status.
    ///
    /// Reserved codes map to their protocol variant, anything else becomes
    /// `App`.
    pub fn from_code(code: i32) -> Self {
        match code {
            Self::CODE_OK => Status::Ok,
            Self::CODE_ERROR => Status::Error,
            Self::CODE_CANCELLED => Status::Cancelled,
            Self::CODE_STACK_OVERFLOW => Status::StackOverflow,
            Self::CODE_INVALID_DEPTH => Status::InvalidDepth,
            Self::CODE_RUNTIME_CORRUPTION => Status::RuntimeCorruption,
            other => Status::App(other),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => f.write_str("ok"),
            Status::Running => f.write_str("running"),
            Status::Error => f.write_str("error"),
            Status::Cancelled => f.write_str("cancelled"),
            Status::StackOverflow => f.write_str("stack overflow"),
            Status::InvalidDepth => f.write_str("invalid depth"),
            Status::RuntimeCorruption => f.write_str("runtime corruption"),
            Status::App(code) => write!(f, "app({})", code),
        }
    }
}
