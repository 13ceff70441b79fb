use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::PrimeField;

/// Dense univariate polynomial over a [PrimeField].
///
/// Coefficients are stored in ascending order of degree: `coeffs[i]` is the
/// coefficient of `x^i`. Coefficients are always reduced and the vector
/// never ends in a zero, so the zero polynomial is the empty vector.
///
/// A polynomial does not remember its field. Every operation takes the
/// field explicitly, and mixing polynomials from different fields is the
/// caller's mistake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Poly {
    coeffs: Vec<BigUint>,
}

impl Poly {
    /// Creates a polynomial from coefficients in ascending order of degree,
    /// reducing each coefficient into the field.
    pub fn new(field: &PrimeField, coeffs: Vec<BigUint>) -> Self {
        Self::from_reduced(coeffs.iter().map(|c| field.reduce(c)).collect())
    }

    fn from_reduced(coeffs: Vec<BigUint>) -> Self {
        let mut poly = Self { coeffs };
        poly.normalize();
        poly
    }

    pub fn zero() -> Self {
        Self { coeffs: vec![] }
    }

    pub fn one() -> Self {
        Self { coeffs: vec![BigUint::one()] }
    }

    pub fn constant(field: &PrimeField, c: &BigUint) -> Self {
        Self::from_reduced(vec![field.reduce(c)])
    }

    /// The polynomial `x`.
    pub fn x() -> Self {
        Self {
            coeffs: vec![BigUint::zero(), BigUint::one()],
        }
    }

    /// The monic polynomial `(x - r_1)(x - r_2)...(x - r_n)`.
    pub fn from_roots(field: &PrimeField, roots: &[BigUint]) -> Self {
        let mut poly = Self::one();
        for root in roots {
            let linear = Self::from_reduced(vec![field.neg(root), BigUint::one()]);
            poly = poly.mul(field, &linear);
        }
        poly
    }

    fn normalize(&mut self) {
        while matches!(self.coeffs.last(), Some(c) if c.is_zero()) {
            self.coeffs.pop();
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn leading_coeff(&self) -> Option<&BigUint> {
        self.coeffs.last()
    }

    pub fn is_monic(&self) -> bool {
        self.leading_coeff().map_or(false, |c| c.is_one())
    }

    /// The coefficient of `x^i`, which is zero past the degree.
    pub fn coeff(&self, i: usize) -> BigUint {
        self.coeffs.get(i).cloned().unwrap_or_default()
    }

    pub fn coefficients(&self) -> &[BigUint] {
        &self.coeffs
    }

    /// Evaluates the polynomial at `x` using Horner's method.
    pub fn eval(&self, field: &PrimeField, x: &BigUint) -> BigUint {
        let x = field.reduce(x);
        self.coeffs.iter().rev().fold(BigUint::zero(), |acc, c| {
            field.add(&field.mul(&acc, &x), c)
        })
    }

    /// Scales the polynomial so the leading coefficient is 1. `None` for the
    /// zero polynomial or if the leading coefficient is not invertible.
    pub fn monic(&self, field: &PrimeField) -> Option<Self> {
        let lc = self.leading_coeff()?;
        if lc.is_one() {
            return Some(self.clone());
        }
        let lc_inv = field.inv(lc)?;
        Some(Self::from_reduced(
            self.coeffs.iter().map(|c| field.mul(c, &lc_inv)).collect(),
        ))
    }

    pub fn add(&self, field: &PrimeField, rhs: &Self) -> Self {
        let len = std::cmp::max(self.coeffs.len(), rhs.coeffs.len());
        Self::from_reduced(
            (0..len)
                .map(|i| field.add(&self.coeff(i), &rhs.coeff(i)))
                .collect(),
        )
    }

    pub fn sub(&self, field: &PrimeField, rhs: &Self) -> Self {
        let len = std::cmp::max(self.coeffs.len(), rhs.coeffs.len());
        Self::from_reduced(
            (0..len)
                .map(|i| field.sub(&self.coeff(i), &rhs.coeff(i)))
                .collect(),
        )
    }

    pub fn mul(&self, field: &PrimeField, rhs: &Self) -> Self {
        if self.is_zero() || rhs.is_zero() {
            return Self::zero();
        }
        let mut coeffs = vec![BigUint::zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Self::new(field, coeffs)
    }

    /// Polynomial long division. Returns `(quotient, remainder)`, or `None`
    /// if the divisor is zero or its leading coefficient is not invertible.
    pub fn div_rem(&self, field: &PrimeField, divisor: &Self) -> Option<(Self, Self)> {
        let divisor_deg = divisor.degree()?;
        let self_deg = match self.degree() {
            Some(deg) if deg >= divisor_deg => deg,
            _ => return Some((Self::zero(), self.clone())),
        };
        let lc_inv = field.inv(divisor.leading_coeff()?)?;

        let mut remainder = self.coeffs.clone();
        let mut quotient = vec![BigUint::zero(); self_deg - divisor_deg + 1];
        for k in (0..quotient.len()).rev() {
            let c = field.mul(&remainder[k + divisor_deg], &lc_inv);
            if c.is_zero() {
                continue;
            }
            // remainder -= c * x^k * divisor
            for (i, d) in divisor.coeffs.iter().enumerate() {
                remainder[k + i] = field.sub(&remainder[k + i], &field.mul(&c, d));
            }
            quotient[k] = c;
        }
        remainder.truncate(divisor_deg);
        Some((Self::from_reduced(quotient), Self::from_reduced(remainder)))
    }

    pub fn rem(&self, field: &PrimeField, divisor: &Self) -> Option<Self> {
        self.div_rem(field, divisor).map(|(_, r)| r)
    }

    /// The monic greatest common divisor, or zero if both inputs are zero.
    pub fn gcd(field: &PrimeField, a: &Self, b: &Self) -> Option<Self> {
        let mut a = a.clone();
        let mut b = b.clone();
        while !b.is_zero() {
            let r = a.rem(field, &b)?;
            a = std::mem::replace(&mut b, r);
        }
        if a.is_zero() {
            return Some(a);
        }
        a.monic(field)
    }

    /// Computes `base^exp mod self` by square-and-multiply.
    pub fn powmod(&self, field: &PrimeField, base: &Self, exp: &BigUint) -> Option<Self> {
        let base = base.rem(field, self)?;
        let mut result = Self::one().rem(field, self)?;
        for i in (0..exp.bits()).rev() {
            result = result.mul(field, &result).rem(field, self)?;
            if exp.bit(i) {
                result = result.mul(field, &base).rem(field, self)?;
            }
        }
        Some(result)
    }

    /// The formal derivative.
    pub fn derivative(&self, field: &PrimeField) -> Self {
        Self::new(
            field,
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * BigUint::from(i))
                .collect(),
        )
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (i, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            match (i, c.is_one()) {
                (0, _) => write!(f, "{}", c)?,
                (1, true) => write!(f, "x")?,
                (1, false) => write!(f, "{}x", c)?,
                (_, true) => write!(f, "x^{}", i)?,
                (_, false) => write!(f, "{}x^{}", c, i)?,
            }
        }
        Ok(())
    }
}
