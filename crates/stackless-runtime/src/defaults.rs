//! Default constants for scheduler configuration.

/// Active task limit used by [`SchedulerLimits::restricted`](crate::SchedulerLimits::restricted).
pub const RESTRICTED_MAX_TASKS: usize = 16;
