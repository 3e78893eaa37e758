//! Pure game logic for Prime Lock Lab.
//!
//! A lock hides a secret number `N` and reveals a public factor `P`. The
//! player guesses `N` from the multiples of `P` up to [`GUESS_CEILING`].
//! Composite locks reveal a large factor and shrink the search; prime locks
//! can only reveal `P = 1`, which leaves a blind search over `1..=100`.
//!
//! # Architecture
//!
//! - **Catalogs**: static tables of public factors and lock primes
//! - **LockGenerator**: draws a fresh [`Round`] for a [`LockMode`]
//! - **evaluate**: compares a guess against the secret
//!
//! # Example
//!
//! ```
//! use prime_lock_core::{LockGenerator, LockMode, evaluate};
//!
//! let mut generator = LockGenerator::seeded(7);
//! let round = generator.generate(LockMode::Composite);
//! assert!(round.guess_space().contains(round.secret()));
//! assert!(evaluate(&round, round.secret()).is_hit());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod catalog;
mod evaluate;
mod generator;
mod mode;
mod round;

pub use catalog::{COFACTOR_MAX, COFACTOR_MIN, GUESS_CEILING, LOCK_PRIMES, PUBLIC_FACTORS};
pub use evaluate::{GuessOutcome, evaluate};
pub use generator::{LockGenerator, generate};
pub use mode::LockMode;
pub use round::{GuessSpace, Round, RoundError};
