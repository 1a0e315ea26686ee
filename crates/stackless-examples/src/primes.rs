//! Prime number generator

use stackless_core::{resume_labels, Context, Entry, Generator, Status, Step};

resume_labels! {
    enum PrimesAt { Found }
}

/// Trial division state carried between yields
#[derive(Debug, Clone)]
pub struct Primes {
    /// Largest candidate tested
    limit: u64,
    /// Next candidate
    candidate: u64,
    /// Primes yielded so far
    found: Vec<u64>,
}

impl Primes {
    /// State yielding every prime up to and including `limit`
    pub fn up_to(limit: u64) -> Self {
        Self {
            limit,
            candidate: 2,
            found: Vec::new(),
        }
    }

    /// Primes yielded so far
    pub fn found(&self) -> &[u64] {
        &self.found
    }
}

fn next_prime(ctx: &mut Context, state: &mut Primes) -> Step<u64> {
    let frame = match ctx.enter::<PrimesAt>() {
        Entry::Start(frame) | Entry::Resume(frame, PrimesAt::Found) => frame,
        Entry::Cancelled(frame) => return Step::Complete(ctx.exit(frame, Status::Cancelled)),
        Entry::Finished(status) => return Step::Complete(status),
    };

    while state.candidate <= state.limit {
        let n = state.candidate;
        state.candidate += 1;
        let is_prime = state
            .found
            .iter()
            .take_while(|&&p| p * p <= n)
            .all(|&p| n % p != 0);
        if is_prime {
            state.found.push(n);
            return ctx.yield_value(frame, PrimesAt::Found, n);
        }
    }
    Step::Complete(ctx.exit(frame, Status::Ok))
}

/// Generator over the primes up to `limit`
pub fn primes(limit: u64) -> Generator<Primes, u64> {
    Generator::new(next_prime, Primes::up_to(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primes_below_thirty() {
        let values: Vec<u64> = primes(30).collect();
        assert_eq!(values, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn test_no_primes_below_two() {
        let mut generator = primes(1);
        assert_eq!(generator.resume(), Step::Complete(Status::Ok));
        assert!(generator.state().found().is_empty());
    }

    #[test]
    fn test_cancel_mid_sequence() {
        let mut generator = primes(100);
        assert_eq!(generator.resume(), Step::Yield(2));
        assert_eq!(generator.resume(), Step::Yield(3));
        assert!(generator.cancel());
        assert_eq!(generator.resume(), Step::Complete(Status::Cancelled));
        assert_eq!(generator.state().found(), &[2, 3]);
    }
}
