//! Stackless resumable procedures
//!
//! This crate provides the control-flow protocol behind Stackless tasks:
//! - **Context**: depth counter and per-depth frame slots shared by a
//!   procedure and everything it transitively awaits (`context` module)
//! - **Labels**: per-procedure enums of suspension points (`label` module)
//! - **Status**: the outcome of one invocation (`status` module)
//! - **Generators**: pull-based value production (`generator` module)
//!
//! A resumable procedure is an explicit state machine. It enters its frame,
//! dispatches on the label it last suspended at, and either suspends again
//! (returning [`Status::Running`]) or exits with a terminal status. State
//! that must survive a suspension lives in a caller-provided struct, never in
//! locals.
//!
//! # Example
//!
//! ```rust,ignore
//! use stackless_core::{resume_labels, settle, Context, Entry, Status};
//!
//! resume_labels! {
//!     enum At { Waiting }
//! }
//!
//! fn outer(ctx: &mut Context, state: &mut State) -> Status {
//!     let frame = match ctx.enter::<At>() {
//!         Entry::Start(frame) => {
//!             ctx.prime(frame);
//!             frame
//!         }
//!         Entry::Resume(frame, At::Waiting) => frame,
//!         Entry::Cancelled(frame) => return ctx.exit(frame, Status::Cancelled),
//!         Entry::Finished(status) => return status,
//!     };
//!     let child = settle!(ctx, frame, At::Waiting, inner(ctx, state));
//!     ctx.exit(frame, child)
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod context;
pub mod defaults;
pub mod error;
pub mod generator;
pub mod label;
pub mod status;

pub use context::{Awaited, Context, Entry, Frame, Slot};
pub use defaults::MAX_DEPTH;
pub use error::ProtocolError;
pub use generator::{Generator, GeneratorFn, Step};
pub use label::{ResumeLabel, ResumePoint};
pub use status::Status;
