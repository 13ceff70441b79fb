//! Recovers an unordered multiset of field elements from its power sums.
//!
//! In a DiceMix-style anonymous aggregation, each of several participants
//! publishes a vector of power sums of its own values, masked so that only
//! the element-wise total is meaningful. If `X` is the multiset of all
//! `n` values, the total is the vector of the first `n` power sums of `X`
//! modulo a prime `p`: the `i`-th entry is the sum of `x^i` for all `x` in
//! `X`. This crate turns that total back into `X`.
//!
//! The power sums determine the elementary symmetric polynomials of `X`
//! through Newton's identities, and those are the coefficients of the monic
//! polynomial whose roots are exactly `X`. Factoring that polynomial over
//! the field yields the values, with multiplicity. The output is sorted, so
//! it carries no information about who contributed which value.
//!
//! ```
//! use num_bigint::BigUint;
//!
//! let prime = BigUint::from(101u32);
//! // 2 + 5 + 7, 4 + 25 + 49, 8 + 125 + 343 (mod 101)
//! let sums = [14u32, 78, 72].map(BigUint::from);
//! let values = psum_solver::solve(3, &prime, &sums).unwrap();
//! assert_eq!(values, [2u32, 5, 7].map(BigUint::from));
//! ```
//!
//! A power sum vector that is not the power sums of any `n` field elements
//! is rejected with [SolveError::InvalidReconstruction]. The prime is
//! assumed to be prime and is not checked.

#[macro_use]
extern crate log;

pub mod config;
mod error;

pub use error::{ErrorKind, InputError, ReconstructionError, SolveError};

/// Modular arithmetic and polynomials over a prime field.
pub mod arithmetic {
    mod field;
    mod poly;

    pub use field::PrimeField;
    pub use poly::Poly;
}

pub mod factor;
mod power_sum;
mod solver;

pub use config::SolverConfig;
pub use factor::{CantorZassenhaus, Factor, Factorizer};
pub use power_sum::PowerSums;
pub use solver::{characteristic_polynomial, extract_roots, parse_decimal, validate, Solver};

use num_bigint::BigUint;

/// Recovers the `count` values whose power sums mod `prime` are `sums`,
/// using the default [Solver].
pub fn solve(count: usize, prime: &BigUint, sums: &[BigUint]) -> Result<Vec<BigUint>, SolveError> {
    Solver::new().solve(count, prime, sums)
}

/// Recovers values over the DiceMix field `2^61 - 1` from `u64` power sums,
/// one value per power sum.
pub fn solve_u64(sums: &[u64]) -> Result<Vec<u64>, SolveError> {
    Solver::new().solve_u64(sums)
}

mod ffi;
pub use ffi::psum_solve;
