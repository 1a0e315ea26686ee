//! Demo clients of the stackless runtime
//!
//! - [`primes`]: a generator yielding primes by trial division
//! - [`sleepers`]: two timer-driven tasks, one cancelling the other

pub mod primes;
pub mod sleepers;

/// Install the `tracing` subscriber used by the demo binaries.
///
/// Honors `RUST_LOG`, falling back to `default_filter`.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
