//! Round and guess space types.

use crate::catalog::{COFACTOR_MIN, GUESS_CEILING, LOCK_PRIMES, PUBLIC_FACTORS, max_cofactor};
use crate::mode::LockMode;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Ordered candidates the player may choose from.
///
/// Always the multiples of the public factor from the factor itself up to
/// [`GUESS_CEILING`], ascending and without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GuessSpace(Vec<u32>);

impl GuessSpace {
    /// Enumerates `factor, 2 * factor, ...` up to `ceiling` inclusive.
    ///
    /// A zero factor yields an empty space.
    pub fn multiples_of(factor: u32, ceiling: u32) -> Self {
        if factor == 0 {
            return Self(Vec::new());
        }
        Self((factor..=ceiling).step_by(factor as usize).collect())
    }

    /// Returns true if `value` is one of the candidates.
    pub fn contains(&self, value: u32) -> bool {
        self.0.binary_search(&value).is_ok()
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Candidate at `index`, if any.
    pub fn get(&self, index: usize) -> Option<u32> {
        self.0.get(index).copied()
    }

    /// Position of `value` among the candidates.
    pub fn position(&self, value: u32) -> Option<usize> {
        self.0.binary_search(&value).ok()
    }

    /// Iterates candidates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Candidates as a slice.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

/// Reasons a round cannot be built from explicit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RoundError {
    /// The public factor is not one a composite lock may reveal.
    #[display("{_0} is not a catalog public factor")]
    UnknownFactor(#[error(not(source))] u32),

    /// The cofactor is outside the range allowed for this factor.
    #[display("cofactor {cofactor} is out of range for public factor {factor}")]
    CofactorOutOfRange {
        /// Public factor `P`.
        factor: u32,
        /// Rejected cofactor `Q`.
        cofactor: u32,
    },

    /// The secret is not one of the lock primes.
    #[display("{_0} is not a catalog lock prime")]
    UnknownPrime(#[error(not(source))] u32),

    /// The secret is not a multiple of the public factor the mode requires.
    #[display("secret {secret} does not match public factor {factor}")]
    FactorMismatch {
        /// Claimed secret `N`.
        secret: u32,
        /// Claimed public factor `P`.
        factor: u32,
    },
}

/// Serialized fields of a [`Round`]; the guess space is rebuilt, not trusted.
#[derive(Deserialize)]
struct RoundFields {
    mode: LockMode,
    secret: u32,
    public_factor: u32,
    #[serde(default)]
    solved: bool,
}

impl TryFrom<RoundFields> for Round {
    type Error = RoundError;

    fn try_from(fields: RoundFields) -> Result<Self, Self::Error> {
        let RoundFields {
            mode,
            secret,
            public_factor,
            solved,
        } = fields;
        let mismatch = RoundError::FactorMismatch {
            secret,
            factor: public_factor,
        };

        let mut round = match mode {
            LockMode::Composite => {
                if public_factor == 0 || secret % public_factor != 0 {
                    return Err(mismatch);
                }
                Self::composite(public_factor, secret / public_factor)?
            }
            LockMode::Prime => {
                if public_factor != 1 {
                    return Err(mismatch);
                }
                Self::prime(secret)?
            }
        };
        if solved {
            round.mark_solved();
        }
        Ok(round)
    }
}

/// One round of the lock game.
///
/// Created unsolved; the only mutation is [`Round::mark_solved`].
/// Deserialization goes through the same checks as [`Round::composite`] and
/// [`Round::prime`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoundFields")]
pub struct Round {
    mode: LockMode,
    secret: u32,
    public_factor: u32,
    guess_space: GuessSpace,
    solved: bool,
}

impl Round {
    /// Builds a round without checking the catalogs.
    pub(crate) fn from_parts(mode: LockMode, secret: u32, public_factor: u32) -> Self {
        Self {
            mode,
            secret,
            public_factor,
            guess_space: GuessSpace::multiples_of(public_factor, GUESS_CEILING),
            solved: false,
        }
    }

    /// Builds a composite round `N = factor * cofactor`.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError`] if `factor` is not a catalog factor or `cofactor`
    /// would put the secret outside the guess space.
    #[instrument]
    pub fn composite(factor: u32, cofactor: u32) -> Result<Self, RoundError> {
        if !PUBLIC_FACTORS.contains(&factor) {
            return Err(RoundError::UnknownFactor(factor));
        }
        if !(COFACTOR_MIN..=max_cofactor(factor)).contains(&cofactor) {
            return Err(RoundError::CofactorOutOfRange { factor, cofactor });
        }
        Ok(Self::from_parts(LockMode::Composite, factor * cofactor, factor))
    }

    /// Builds a prime round hiding `secret` behind the trivial factor 1.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::UnknownPrime`] if `secret` is not a lock prime.
    #[instrument]
    pub fn prime(secret: u32) -> Result<Self, RoundError> {
        if !LOCK_PRIMES.contains(&secret) {
            return Err(RoundError::UnknownPrime(secret));
        }
        Ok(Self::from_parts(LockMode::Prime, secret, 1))
    }

    /// Lock mode of this round.
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// The hidden number `N`.
    pub fn secret(&self) -> u32 {
        self.secret
    }

    /// The revealed factor `P`.
    pub fn public_factor(&self) -> u32 {
        self.public_factor
    }

    /// The hidden cofactor `Q = N / P`.
    pub fn cofactor(&self) -> u32 {
        self.secret / self.public_factor.max(1)
    }

    /// Candidates the player chooses from.
    pub fn guess_space(&self) -> &GuessSpace {
        &self.guess_space
    }

    /// Returns true once the secret has been guessed.
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Records that the secret was guessed.
    pub fn mark_solved(&mut self) {
        self.solved = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiples_stop_at_ceiling() {
        let space = GuessSpace::multiples_of(15, 100);
        assert_eq!(space.as_slice(), &[15, 30, 45, 60, 75, 90]);
    }

    #[test]
    fn zero_factor_is_empty() {
        assert!(GuessSpace::multiples_of(0, 100).is_empty());
    }

    #[test]
    fn composite_rejects_unclamped_cofactor() {
        assert_eq!(
            Round::composite(15, 9),
            Err(RoundError::CofactorOutOfRange { factor: 15, cofactor: 9 })
        );
        assert_eq!(Round::composite(7, 3), Err(RoundError::UnknownFactor(7)));
    }

    #[test]
    fn prime_rejects_composites() {
        assert_eq!(Round::prime(91), Err(RoundError::UnknownPrime(91)));
    }

    #[test]
    fn mark_solved_only_flips_flag() {
        let mut round = Round::composite(10, 4).expect("valid round");
        let before = round.clone();
        round.mark_solved();
        assert!(round.is_solved());
        assert_eq!(round.secret(), before.secret());
        assert_eq!(round.guess_space(), before.guess_space());
    }
}
