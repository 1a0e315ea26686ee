//! Default constants for the resumable protocol.

/// Maximum await nesting of one context.
///
/// Every procedure in a call hierarchy occupies one slot; entering a frame
/// past this bound terminates it with `StackOverflow`.
pub const MAX_DEPTH: usize = 32;
