//! Solver parameters.

use num_bigint::BigUint;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Smallest number of hidden values a request may carry.
pub const MIN_COUNT: usize = 2;

/// Largest number of hidden values a request may carry. Factoring a
/// characteristic polynomial of higher degree is rarely what the caller
/// wants.
pub const MAX_COUNT: usize = 1000;

/// All numerals crossing the string boundary are base 10.
pub const RADIX: u32 = 10;

/// The Mersenne prime `2^61 - 1` the DiceMix DC-net aggregates in.
pub const DICEMIX_PRIME_U64: u64 = (1 << 61) - 1;

/// [DICEMIX_PRIME_U64] as an arbitrary-precision integer.
pub static DICEMIX_PRIME: Lazy<BigUint> = Lazy::new(|| BigUint::from(DICEMIX_PRIME_U64));

/// Number of random splitting polynomials tried before equal-degree
/// factorization gives up. Each attempt succeeds with probability at least
/// one half over a prime field.
pub const MAX_SPLIT_ATTEMPTS: usize = 128;

const DEFAULT_SEED: u64 = 0x5eed_d1ce_0061_0001;

/// Runtime configuration for a [Solver](crate::Solver).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Seed for the random polynomials drawn during factorization. A fresh
    /// generator is seeded from this value on every call, so a solver
    /// returns identical results for identical inputs.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}
