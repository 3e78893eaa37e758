//! Guess evaluation.

use crate::round::Round;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Result of comparing a guess with the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuessOutcome {
    hit: bool,
}

impl GuessOutcome {
    /// Outcome of a correct guess.
    pub const HIT: Self = Self { hit: true };

    /// Outcome of a wrong guess.
    pub const MISS: Self = Self { hit: false };

    /// Returns true if the guess matched the secret.
    pub fn is_hit(self) -> bool {
        self.hit
    }
}

/// Compares `guess` with the round's secret.
///
/// Never mutates the round; marking it solved is the caller's job. Guesses
/// outside the guess space are simply misses.
#[instrument(skip(round), fields(mode = %round.mode()))]
pub fn evaluate(round: &Round, guess: u32) -> GuessOutcome {
    if guess == round.secret() {
        GuessOutcome::HIT
    } else {
        GuessOutcome::MISS
    }
}
