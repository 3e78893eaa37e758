//! Lock mode selection.

use serde::{Deserialize, Serialize};

/// Kind of lock the player is trying to break.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LockMode {
    /// The secret is composite and a non-trivial factor is revealed.
    #[default]
    Composite,
    /// The secret is prime, so the only revealed factor is 1.
    Prime,
}

impl LockMode {
    /// Short label shown to players.
    pub fn label(self) -> &'static str {
        match self {
            LockMode::Composite => "Fragile composite",
            LockMode::Prime => "Sturdy prime",
        }
    }
}
