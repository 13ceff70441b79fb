use std::cmp::Ordering;

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, ToPrimitive, Zero};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::arithmetic::{Poly, PrimeField};
use crate::config::{SolverConfig, MAX_SPLIT_ATTEMPTS};
use crate::SolveError;

/// A monic irreducible factor together with its multiplicity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Factor {
    pub poly: Poly,
    pub multiplicity: usize,
}

/// Complete factorization of polynomials over a prime field.
///
/// The solver depends only on this trait, so it can be backed by any
/// algebra library. Implementations must return every irreducible factor of
/// the polynomial with its exponent, such that the product of
/// `factor^multiplicity` is the monic associate of the input. They must be
/// reentrant: one value may be shared by concurrent calls.
pub trait Factorizer {
    fn factor(&self, field: &PrimeField, poly: &Poly) -> Result<Vec<Factor>, SolveError>;
}

/// Factorization by square-free decomposition, distinct-degree
/// factorization, and Cantor-Zassenhaus equal-degree splitting.
///
/// The random splitting polynomials come from a generator seeded afresh on
/// every call, so the output is a deterministic function of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CantorZassenhaus {
    seed: u64,
}

impl CantorZassenhaus {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn with_config(config: &SolverConfig) -> Self {
        Self::new(config.seed)
    }
}

impl Default for CantorZassenhaus {
    fn default() -> Self {
        Self::with_config(&SolverConfig::default())
    }
}

fn arithmetic_fault(step: &str) -> SolveError {
    SolveError::internal(format!("non-invertible leading coefficient during {}", step))
}

fn exact_div(field: &PrimeField, a: &Poly, b: &Poly, step: &str) -> Result<Poly, SolveError> {
    a.div_rem(field, b)
        .map(|(q, _)| q)
        .ok_or_else(|| arithmetic_fault(step))
}

fn gcd(field: &PrimeField, a: &Poly, b: &Poly, step: &str) -> Result<Poly, SolveError> {
    Poly::gcd(field, a, b).ok_or_else(|| arithmetic_fault(step))
}

fn positive_degree(poly: &Poly) -> bool {
    poly.degree().unwrap_or(0) > 0
}

/// Given `f(x) = g(x^p)`, returns `g`. Over `F_p` every coefficient is its
/// own `p`-th root.
fn pth_root(field: &PrimeField, f: &Poly) -> Result<Poly, SolveError> {
    let p = field
        .modulus()
        .to_usize()
        .ok_or_else(|| SolveError::internal("p-th power part in a field larger than the degree"))?;
    Ok(Poly::new(
        field,
        f.coefficients().iter().step_by(p).cloned().collect(),
    ))
}

/// Yun's square-free decomposition of a monic polynomial. Returns pairs
/// `(g, i)` of square-free, pairwise coprime `g` with `f = prod g^i`.
fn square_free(field: &PrimeField, f: &Poly) -> Result<Vec<(Poly, usize)>, SolveError> {
    let mut result = vec![];
    if !positive_degree(f) {
        return Ok(result);
    }

    let df = f.derivative(field);
    let mut c = if df.is_zero() {
        f.clone()
    } else {
        let mut c = gcd(field, f, &df, "square-free decomposition")?;
        let mut w = exact_div(field, f, &c, "square-free decomposition")?;
        let mut i = 1;
        while positive_degree(&w) {
            let y = gcd(field, &w, &c, "square-free decomposition")?;
            let z = exact_div(field, &w, &y, "square-free decomposition")?;
            if positive_degree(&z) {
                result.push((z, i));
            }
            c = exact_div(field, &c, &y, "square-free decomposition")?;
            w = y;
            i += 1;
        }
        c
    };

    // Whatever is left is a polynomial in x^p, only possible when the
    // characteristic does not exceed the degree.
    if positive_degree(&c) {
        c = pth_root(field, &c)?;
        let p = field.modulus().to_usize().unwrap_or(usize::MAX);
        for (g, i) in square_free(field, &c)? {
            result.push((g, i * p));
        }
    }
    Ok(result)
}

/// The Frobenius map `h -> h^p` on `F_p[x] / (f)`.
///
/// The map is linear over `F_p`, so it is stored as the images of the basis,
/// `rows[i] = x^(ip) mod f` for `i < deg f`, and applied to a reduced `h` as
/// the combination of the rows weighted by the coefficients of `h`.
struct Frobenius {
    rows: Vec<Poly>,
}

impl Frobenius {
    fn new(field: &PrimeField, f: &Poly) -> Result<Self, SolveError> {
        let xp = f
            .powmod(field, &Poly::x(), field.modulus())
            .ok_or_else(|| arithmetic_fault("frobenius"))?;
        Self::from_image(field, f, &xp)
    }

    /// Builds the rows from `xp = x^p mod f`.
    fn from_image(field: &PrimeField, f: &Poly, xp: &Poly) -> Result<Self, SolveError> {
        let n = f.degree().unwrap_or(0);
        let mut rows: Vec<Poly> = Vec::with_capacity(n);
        let mut row = Poly::one();
        for i in 0..n {
            if i > 0 {
                row = row
                    .mul(field, xp)
                    .rem(field, f)
                    .ok_or_else(|| arithmetic_fault("frobenius"))?;
            }
            rows.push(row.clone());
        }
        Ok(Self { rows })
    }

    /// `h^p mod f` for `h` of degree less than `deg f`.
    fn apply(&self, field: &PrimeField, h: &Poly) -> Poly {
        debug_assert!(h.coefficients().len() <= self.rows.len());
        let mut acc = vec![BigUint::default(); self.rows.len()];
        for (c, row) in h.coefficients().iter().zip(self.rows.iter()) {
            if c.is_zero() {
                continue;
            }
            for (a, r) in acc.iter_mut().zip(row.coefficients()) {
                *a += c * r;
            }
        }
        Poly::new(field, acc)
    }

    /// The same map on `F_p[x] / (g)` for a divisor `g` of `f`.
    fn restrict(&self, field: &PrimeField, g: &Poly) -> Result<Self, SolveError> {
        let m = g.degree().unwrap_or(0);
        let rows = self
            .rows
            .iter()
            .take(m)
            .map(|row| row.rem(field, g).ok_or_else(|| arithmetic_fault("frobenius")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }
}

/// Splits a monic square-free polynomial into products `(g, d)` where `g` is
/// the product of all irreducible factors of degree `d`.
fn distinct_degree(field: &PrimeField, f: &Poly) -> Result<Vec<(Poly, usize)>, SolveError> {
    let mut result = vec![];
    let mut rest = f.clone();
    // h = x^(p^d) mod rest
    let mut h = Poly::x();
    let mut frobenius: Option<Frobenius> = None;
    let mut d = 1;
    while 2 * d <= rest.degree().unwrap_or(0) {
        h = match &frobenius {
            Some(frobenius) => frobenius.apply(field, &h),
            None => rest
                .powmod(field, &h, field.modulus())
                .ok_or_else(|| arithmetic_fault("distinct-degree factorization"))?,
        };
        let g = gcd(field, &h.sub(field, &Poly::x()), &rest, "distinct-degree factorization")?;
        if positive_degree(&g) {
            rest = exact_div(field, &rest, &g, "distinct-degree factorization")?;
            h = h
                .rem(field, &rest)
                .ok_or_else(|| arithmetic_fault("distinct-degree factorization"))?;
            if let Some(map) = frobenius.take() {
                frobenius = Some(map.restrict(field, &rest)?);
            }
            result.push((g, d));
        }
        // After the first step h is x^p mod rest, which fixes the map.
        if frobenius.is_none() && 2 * (d + 1) <= rest.degree().unwrap_or(0) {
            frobenius = Some(Frobenius::from_image(field, &rest, &h)?);
        }
        d += 1;
    }
    if let Some(deg) = rest.degree().filter(|&deg| deg > 0) {
        result.push((rest, deg));
    }
    Ok(result)
}

/// Random polynomial of degree less than `len`.
fn random_poly(field: &PrimeField, rng: &mut SmallRng, len: usize) -> Poly {
    Poly::new(
        field,
        (0..len)
            .map(|_| rng.gen_biguint_below(field.modulus()))
            .collect(),
    )
}

/// Cantor-Zassenhaus splitting of a monic square-free polynomial whose
/// irreducible factors all have degree `d`.
fn equal_degree(
    field: &PrimeField,
    f: Poly,
    d: usize,
    rng: &mut SmallRng,
) -> Result<Vec<Poly>, SolveError> {
    if f.degree().unwrap_or(0) <= d {
        return Ok(vec![f]);
    }
    if field.modulus() == &BigUint::from(2u32) {
        return Err(SolveError::internal(
            "equal-degree splitting needs an odd characteristic",
        ));
    }
    let frobenius = if d > 1 {
        Some(Frobenius::new(field, &f)?)
    } else {
        None
    };
    // (p - 1) / 2
    let half = (field.modulus() - BigUint::one()) >> 1;
    split_equal_degree(field, f, d, frobenius, &half, rng)
}

fn split_equal_degree(
    field: &PrimeField,
    f: Poly,
    d: usize,
    frobenius: Option<Frobenius>,
    half: &BigUint,
    rng: &mut SmallRng,
) -> Result<Vec<Poly>, SolveError> {
    let n = f.degree().unwrap_or(0);
    if n <= d {
        return Ok(vec![f]);
    }

    for _ in 0..MAX_SPLIT_ATTEMPTS {
        let a = random_poly(field, rng, n);
        if !positive_degree(&a) {
            continue;
        }
        let mut g = gcd(field, &a, &f, "equal-degree factorization")?;
        if !positive_degree(&g) {
            // a^((p^d - 1) / 2) = (a a^p ... a^(p^(d-1)))^((p - 1) / 2)
            let mut norm = a.clone();
            if let Some(frobenius) = &frobenius {
                let mut conjugate = a;
                for _ in 1..d {
                    conjugate = frobenius.apply(field, &conjugate);
                    norm = norm
                        .mul(field, &conjugate)
                        .rem(field, &f)
                        .ok_or_else(|| arithmetic_fault("equal-degree factorization"))?;
                }
            }
            let b = f
                .powmod(field, &norm, half)
                .ok_or_else(|| arithmetic_fault("equal-degree factorization"))?;
            g = gcd(
                field,
                &b.sub(field, &Poly::one()),
                &f,
                "equal-degree factorization",
            )?;
        }
        if positive_degree(&g) && g.degree() < Some(n) {
            let other = exact_div(field, &f, &g, "equal-degree factorization")?;
            let (left, right) = match &frobenius {
                Some(map) => (Some(map.restrict(field, &g)?), Some(map.restrict(field, &other)?)),
                None => (None, None),
            };
            let mut factors = split_equal_degree(field, g, d, left, half, rng)?;
            factors.extend(split_equal_degree(field, other, d, right, half, rng)?);
            return Ok(factors);
        }
    }
    Err(SolveError::internal(format!(
        "no split of a degree {} polynomial after {} attempts",
        n, MAX_SPLIT_ATTEMPTS
    )))
}

/// Orders factors by degree, then by coefficients from the constant term up.
fn compare_factors(a: &Factor, b: &Factor) -> Ordering {
    a.poly
        .degree()
        .cmp(&b.poly.degree())
        .then_with(|| a.poly.coefficients().cmp(b.poly.coefficients()))
        .then_with(|| a.multiplicity.cmp(&b.multiplicity))
}

impl Factorizer for CantorZassenhaus {
    fn factor(&self, field: &PrimeField, poly: &Poly) -> Result<Vec<Factor>, SolveError> {
        if !positive_degree(poly) {
            return Ok(vec![]);
        }
        let f = poly
            .monic(field)
            .ok_or_else(|| arithmetic_fault("normalization"))?;
        let mut rng = SmallRng::seed_from_u64(self.seed);

        let mut factors = vec![];
        for (square_free_part, multiplicity) in square_free(field, &f)? {
            for (same_degree, d) in distinct_degree(field, &square_free_part)? {
                for irreducible in equal_degree(field, same_degree, d, &mut rng)? {
                    factors.push(Factor {
                        poly: irreducible,
                        multiplicity,
                    });
                }
            }
        }
        factors.sort_by(compare_factors);
        trace!(
            "factored degree {} polynomial into {} factors",
            f.degree().unwrap_or(0),
            factors.len()
        );
        Ok(factors)
    }
}

/// The root of a monic linear factor `x - r`.
pub(crate) fn linear_root(field: &PrimeField, factor: &Poly) -> Option<BigUint> {
    if factor.degree() != Some(1) || !factor.is_monic() {
        return None;
    }
    Some(field.neg(&factor.coeff(0)))
}
