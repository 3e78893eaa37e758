//! Static lookup tables for lock generation.

/// Largest value that may appear in a guess space (inclusive).
pub const GUESS_CEILING: u32 = 100;

/// Public factors a composite lock may reveal.
pub const PUBLIC_FACTORS: [u32; 5] = [8, 9, 10, 12, 15];

/// Smallest cofactor `Q` in a composite lock.
pub const COFACTOR_MIN: u32 = 2;

/// Largest cofactor `Q` in a composite lock, before clamping to the ceiling.
pub const COFACTOR_MAX: u32 = 9;

/// Secrets a prime lock may hide.
pub const LOCK_PRIMES: [u32; 19] = [
    17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Largest cofactor usable with `factor` that keeps `factor * q` within the ceiling.
pub(crate) fn max_cofactor(factor: u32) -> u32 {
    COFACTOR_MAX.min(GUESS_CEILING / factor.max(1))
}
