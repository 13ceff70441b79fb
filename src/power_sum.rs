use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::arithmetic::PrimeField;
use crate::{InputError, SolveError};

/// An aggregate of `n` power sums over a prime field.
///
/// If `X` is the hidden multiset, the `i`-th entry (0-indexed) is the sum of
/// `x^(i+1)` for all `x` in `X`, reduced mod `p`. The aggregate reveals `X`
/// but not which contributor supplied which element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSums {
    sums: Vec<BigUint>,
}

impl PowerSums {
    pub fn new(sums: Vec<BigUint>) -> Self {
        Self { sums }
    }

    /// Computes the first `count` power sums of `values`.
    ///
    /// # Examples
    ///
    /// ```
    /// use num_bigint::BigUint;
    /// use psum_solver::PowerSums;
    /// use psum_solver::arithmetic::PrimeField;
    ///
    /// let field = PrimeField::new(BigUint::from(101u32)).unwrap();
    /// let values = [2u32, 5, 7].map(BigUint::from);
    /// let sums = PowerSums::from_values(&field, &values, 3);
    /// assert_eq!(sums.as_slice(), &[14u32, 78, 72].map(BigUint::from));
    /// ```
    pub fn from_values(field: &PrimeField, values: &[BigUint], count: usize) -> Self {
        let mut sums = vec![BigUint::default(); count];
        for value in values {
            let x = field.reduce(value);
            let mut y = x.clone();
            for sum in sums.iter_mut() {
                *sum = field.add(sum, &y);
                y = field.mul(&y, &x);
            }
        }
        Self { sums }
    }

    /// Adds the contributions of several participants element-wise, giving
    /// the power sums of the union of their multisets. All contributions must
    /// have the same length.
    pub fn combine(field: &PrimeField, contributions: &[PowerSums]) -> Result<Self, SolveError> {
        let len = contributions.first().map_or(0, PowerSums::len);
        let mut sums = vec![BigUint::default(); len];
        for contribution in contributions {
            if contribution.len() != len {
                return Err(InputError::LengthMismatch {
                    expected: len,
                    actual: contribution.len(),
                }
                .into());
            }
            for (sum, x) in sums.iter_mut().zip(contribution.sums.iter()) {
                *sum = field.add(sum, x);
            }
        }
        Ok(Self { sums })
    }

    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    pub fn as_slice(&self) -> &[BigUint] {
        &self.sums
    }

    pub fn into_inner(self) -> Vec<BigUint> {
        self.sums
    }

    /// Converts the `n` power sums to the `n` non-leading coefficients of
    /// the monic degree-`n` polynomial whose roots are the hidden values,
    /// using [Newton's identities](https://en.wikipedia.org/wiki/Newton%27s_identities).
    ///
    /// The `i`-th coefficient is `(-1)^(i+1) e_(i+1)`, the coefficient of
    /// `x^(n-1-i)`. Requires `p > n` so that every `-(i+1)` is invertible.
    pub fn to_coeffs(&self, field: &PrimeField) -> Result<Vec<BigUint>, SolveError> {
        let mut coeffs: Vec<BigUint> = Vec::with_capacity(self.sums.len());
        for i in 0..self.sums.len() {
            // sum_{k<i} C[k] * S[i-1-k]
            let mut acc = field.reduce(&self.sums[i]);
            for k in 0..i {
                acc = field.add(&acc, &field.mul(&coeffs[k], &self.sums[i - 1 - k]));
            }
            let divisor = field.neg(&field.from_u64(i as u64 + 1));
            let inv = field.inv(&divisor).ok_or_else(|| {
                SolveError::internal(format!("{} has no inverse mod {}", i + 1, field.modulus()))
            })?;
            let coeff = field.mul(&acc, &inv);
            trace!("coeff[{}] = {}", i, coeff);
            coeffs.push(coeff);
        }
        Ok(coeffs)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SolveError> {
        bincode::serialize(self).map_err(|e| SolveError::internal(e.to_string()))
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, SolveError> {
        bincode::deserialize(buf).map_err(|e| InputError::MalformedEncoding(e.to_string()).into())
    }
}

impl From<Vec<BigUint>> for PowerSums {
    fn from(sums: Vec<BigUint>) -> Self {
        Self::new(sums)
    }
}
