//! Random lock generation.

use crate::catalog::{COFACTOR_MIN, LOCK_PRIMES, PUBLIC_FACTORS, max_cofactor};
use crate::mode::LockMode;
use crate::round::Round;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

/// Draws fresh rounds from the static catalogs.
///
/// The generator owns its random source so that a seeded instance replays
/// the same sequence of rounds.
#[derive(Debug, Clone)]
pub struct LockGenerator<R = StdRng> {
    rng: R,
}

impl LockGenerator<StdRng> {
    /// Creates a generator seeded from OS entropy.
    #[instrument]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a generator that replays a fixed sequence.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for LockGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> LockGenerator<R> {
    /// Wraps an arbitrary random source.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generates an unsolved round for `mode`.
    ///
    /// Composite rounds pick `P` from the public factor catalog and `Q` from
    /// `2..=min(9, 100 / P)`, so the secret always lies in the guess space.
    /// Prime rounds pick `N` from the lock primes and reveal `P = 1`.
    #[instrument(skip(self))]
    pub fn generate(&mut self, mode: LockMode) -> Round {
        let round = match mode {
            LockMode::Composite => {
                let factor = PUBLIC_FACTORS[self.rng.gen_range(0..PUBLIC_FACTORS.len())];
                let cofactor = self.rng.gen_range(COFACTOR_MIN..=max_cofactor(factor));
                Round::from_parts(mode, factor * cofactor, factor)
            }
            LockMode::Prime => {
                let secret = LOCK_PRIMES[self.rng.gen_range(0..LOCK_PRIMES.len())];
                Round::from_parts(mode, secret, 1)
            }
        };

        debug!(
            public_factor = round.public_factor(),
            candidates = round.guess_space().len(),
            "Generated lock"
        );
        round
    }
}

/// Generates a round using a thread-local entropy source.
#[instrument]
pub fn generate(mode: LockMode) -> Round {
    LockGenerator::with_rng(rand::thread_rng()).generate(mode)
}
