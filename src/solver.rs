use std::panic::{self, AssertUnwindSafe};

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};

use crate::arithmetic::{Poly, PrimeField};
use crate::config::{SolverConfig, DICEMIX_PRIME, MAX_COUNT, MIN_COUNT, RADIX};
use crate::factor::{linear_root, CantorZassenhaus, Factor, Factorizer};
use crate::{InputError, PowerSums, ReconstructionError, SolveError};

/// Checks the shape of a request before any arithmetic is attempted.
///
/// Requires `MIN_COUNT <= count <= MAX_COUNT`, exactly `count` power sums,
/// and `prime > count`. The prime is not tested for primality.
pub fn validate(count: usize, prime: &BigUint, sums: &[BigUint]) -> Result<PrimeField, SolveError> {
    if !(MIN_COUNT..=MAX_COUNT).contains(&count) {
        return Err(InputError::CountOutOfRange {
            count,
            min: MIN_COUNT,
            max: MAX_COUNT,
        }
        .into());
    }
    if sums.len() != count {
        return Err(InputError::LengthMismatch {
            expected: count,
            actual: sums.len(),
        }
        .into());
    }
    if *prime <= BigUint::from(count) {
        return Err(InputError::PrimeTooSmall {
            prime: prime.clone(),
            count,
        }
        .into());
    }
    PrimeField::new(prime.clone())
        .ok_or_else(|| SolveError::internal("modulus rejected after validation"))
}

/// Lays out the coefficients from [PowerSums::to_coeffs] as the monic
/// polynomial `x^n + C[0] x^(n-1) + ... + C[n-1]`.
pub fn characteristic_polynomial(field: &PrimeField, coeffs: &[BigUint]) -> Poly {
    let mut ascending: Vec<BigUint> = coeffs.iter().rev().cloned().collect();
    ascending.push(BigUint::one());
    Poly::new(field, ascending)
}

/// Expands a factorization into the sorted multiset of roots.
///
/// Every factor must be monic and linear, and the multiplicities must add
/// up to `count`. Anything else means the power sums did not come from a
/// multiset of `count` field elements.
pub fn extract_roots(
    field: &PrimeField,
    factors: &[Factor],
    count: usize,
) -> Result<Vec<BigUint>, SolveError> {
    let mut linear = Vec::with_capacity(factors.len());
    for factor in factors {
        let root = linear_root(field, &factor.poly).ok_or(ReconstructionError::NonLinearFactor {
            degree: factor.poly.degree().unwrap_or(0),
        })?;
        linear.push((root, factor.multiplicity));
    }

    let found = linear
        .iter()
        .fold(0usize, |acc, (_, multiplicity)| acc.saturating_add(*multiplicity));
    if found != count {
        return Err(ReconstructionError::RootCountMismatch {
            found,
            expected: count,
        }
        .into());
    }

    let mut roots = Vec::with_capacity(count);
    for (root, multiplicity) in linear {
        roots.extend(std::iter::repeat(root).take(multiplicity));
    }
    roots.sort();
    Ok(roots)
}

/// Parses a base-10 numeral. Only ASCII digits are accepted.
///
/// A sign, even `-` on an otherwise valid numeral, is a malformed numeral
/// rather than a value to reduce mod `p`: power sums and the prime are
/// residues and are always written non-negative.
pub fn parse_decimal(numeral: &str) -> Result<BigUint, SolveError> {
    if numeral.is_empty() || !numeral.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::MalformedNumeral(numeral.to_string()).into());
    }
    BigUint::parse_bytes(numeral.as_bytes(), RADIX)
        .ok_or_else(|| InputError::MalformedNumeral(numeral.to_string()).into())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs `f`, turning a panic into [SolveError::Internal].
pub(crate) fn fault_boundary<T>(f: impl FnOnce() -> Result<T, SolveError>) -> Result<T, SolveError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            error!("fault during reconstruction: {}", msg);
            Err(SolveError::Internal(msg))
        }
    }
}

/// Recovers a multiset of field elements from its power sums.
///
/// The pipeline is: validate the request, derive the characteristic
/// polynomial's coefficients by Newton's identities, factor the polynomial,
/// and read the roots off its linear factors. The solver holds no state
/// between calls and can be shared across threads if its factorizer can.
#[derive(Clone, Debug, Default)]
pub struct Solver<F = CantorZassenhaus> {
    factorizer: F,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &SolverConfig) -> Self {
        Self::with_factorizer(CantorZassenhaus::with_config(config))
    }
}

impl<F: Factorizer> Solver<F> {
    pub fn with_factorizer(factorizer: F) -> Self {
        Self { factorizer }
    }

    pub fn factorizer(&self) -> &F {
        &self.factorizer
    }

    /// Recovers the `count` values whose first `count` power sums mod
    /// `prime` are `sums`, sorted ascending.
    ///
    /// # Examples
    ///
    /// ```
    /// use num_bigint::BigUint;
    /// use psum_solver::Solver;
    ///
    /// let prime = BigUint::from(101u32);
    /// let sums = [14u32, 78, 72].map(BigUint::from);
    /// let values = Solver::new().solve(3, &prime, &sums).unwrap();
    /// assert_eq!(values, [2u32, 5, 7].map(BigUint::from));
    /// ```
    pub fn solve(
        &self,
        count: usize,
        prime: &BigUint,
        sums: &[BigUint],
    ) -> Result<Vec<BigUint>, SolveError> {
        debug!("received p = {}, n = {}", prime, count);
        let field = validate(count, prime, sums)?;

        let coeffs = PowerSums::new(sums.to_vec()).to_coeffs(&field)?;
        let poly = characteristic_polynomial(&field, &coeffs);
        trace!("characteristic polynomial: {}", poly);
        if poly.degree() != Some(count) {
            return Err(SolveError::internal(format!(
                "characteristic polynomial has degree {:?}, expected {}",
                poly.degree(),
                count
            )));
        }

        let factors = self.factorizer.factor(&field, &poly)?;
        debug!("factored characteristic polynomial into {} factors", factors.len());
        extract_roots(&field, &factors, count).map_err(|e| {
            warn!("rejecting power sums: {}", e);
            e
        })
    }

    /// Like [solve](Solver::solve), taking the length from the aggregate.
    pub fn solve_power_sums(
        &self,
        prime: &BigUint,
        sums: &PowerSums,
    ) -> Result<Vec<BigUint>, SolveError> {
        self.solve(sums.len(), prime, sums.as_slice())
    }

    /// Decimal-string front end.
    ///
    /// Parses `prime` and `sums` as base-10 numerals, reconstructs, and
    /// returns the values as base-10 numerals. No value's encoding is longer
    /// than the prime's. Panics raised anywhere inside are caught and
    /// reported as [SolveError::Internal].
    pub fn solve_decimal(
        &self,
        count: usize,
        prime: &str,
        sums: &[&str],
    ) -> Result<Vec<String>, SolveError> {
        fault_boundary(|| {
            let p = parse_decimal(prime)?;
            let sums = sums
                .iter()
                .map(|sum| parse_decimal(sum))
                .collect::<Result<Vec<_>, _>>()?;
            let values = self.solve(count, &p, &sums)?;
            values
                .iter()
                .map(|value| {
                    let encoded = value.to_str_radix(RADIX);
                    if encoded.len() > prime.len() {
                        return Err(InputError::OutputTooLong {
                            value: encoded,
                            limit: prime.len(),
                        }
                        .into());
                    }
                    Ok(encoded)
                })
                .collect()
        })
    }

    /// Reconstructs over the DiceMix field `2^61 - 1` with one value per
    /// power sum.
    pub fn solve_u64(&self, sums: &[u64]) -> Result<Vec<u64>, SolveError> {
        let sums: Vec<BigUint> = sums.iter().map(|&sum| BigUint::from(sum)).collect();
        self.solve(sums.len(), &DICEMIX_PRIME, &sums)?
            .iter()
            .map(|value| {
                value
                    .to_u64()
                    .ok_or_else(|| SolveError::internal(format!("{} does not fit in u64", value)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DICEMIX_PRIME_U64;
    use crate::ErrorKind;

    const P: u64 = 101;

    fn n(value: u64) -> BigUint {
        BigUint::from(value)
    }

    fn values(values: &[u64]) -> Vec<BigUint> {
        values.iter().map(|&v| BigUint::from(v)).collect()
    }

    fn field(p: u64) -> PrimeField {
        PrimeField::new(n(p)).unwrap()
    }

    /// Hands back a fixed factorization regardless of the input.
    struct FixedFactorizer(Vec<Factor>);

    impl Factorizer for FixedFactorizer {
        fn factor(&self, _field: &PrimeField, _poly: &Poly) -> Result<Vec<Factor>, SolveError> {
            Ok(self.0.clone())
        }
    }

    struct PanickingFactorizer;

    impl Factorizer for PanickingFactorizer {
        fn factor(&self, _field: &PrimeField, _poly: &Poly) -> Result<Vec<Factor>, SolveError> {
            panic!("scratch space exhausted")
        }
    }

    fn linear_factor(root: u64, multiplicity: usize) -> Factor {
        Factor {
            poly: Poly::from_roots(&field(P), &values(&[root])),
            multiplicity,
        }
    }

    #[test]
    fn test_validate() {
        let sums = values(&[1, 2, 3]);
        assert!(validate(3, &n(P), &sums).is_ok());
        assert_eq!(validate(3, &n(4), &sums).unwrap().modulus(), &n(4));
        assert_eq!(
            validate(1, &n(P), &sums[..1]),
            Err(SolveError::Input(InputError::CountOutOfRange { count: 1, min: 2, max: 1000 }))
        );
        assert_eq!(
            validate(3, &n(P), &sums[..2]),
            Err(SolveError::Input(InputError::LengthMismatch { expected: 3, actual: 2 }))
        );
        assert_eq!(
            validate(3, &n(3), &sums),
            Err(SolveError::Input(InputError::PrimeTooSmall { prime: n(3), count: 3 }))
        );
        assert_eq!(validate(1001, &n(P), &sums).unwrap_err().kind(), ErrorKind::Input);
    }

    #[test]
    fn test_validate_bounds_inclusive() {
        let sums = vec![BigUint::default(); 1000];
        assert!(validate(1000, &DICEMIX_PRIME, &sums).is_ok());
        assert!(validate(1000, &n(1001), &sums).is_ok());
        assert_eq!(
            validate(1000, &n(1000), &sums),
            Err(SolveError::Input(InputError::PrimeTooSmall { prime: n(1000), count: 1000 }))
        );
        assert!(validate(2, &n(3), &sums[..2]).is_ok());
    }

    #[test]
    fn test_characteristic_polynomial() {
        let field = field(P);
        let poly = characteristic_polynomial(&field, &values(&[87, 59, 31]));
        assert_eq!(poly, Poly::from_roots(&field, &values(&[2, 5, 7])));
        assert_eq!(poly.degree(), Some(3));
        assert!(poly.is_monic());
        // zero coefficients keep the degree
        let poly = characteristic_polynomial(&field, &values(&[0, 0]));
        assert_eq!(poly.degree(), Some(2));
        assert_eq!(poly.to_string(), "x^2");
    }

    #[test]
    fn test_extract_roots() {
        let field = field(P);
        let factors = vec![linear_factor(7, 1), linear_factor(2, 2), linear_factor(0, 1)];
        assert_eq!(extract_roots(&field, &factors, 4).unwrap(), values(&[0, 2, 2, 7]));
    }

    #[test]
    fn test_extract_roots_non_linear() {
        let field = field(P);
        let quadratic = Factor {
            poly: Poly::new(&field, values(&[99, 0, 1])),
            multiplicity: 1,
        };
        assert_eq!(
            extract_roots(&field, &[linear_factor(3, 1), quadratic], 3),
            Err(SolveError::InvalidReconstruction(ReconstructionError::NonLinearFactor {
                degree: 2
            }))
        );
        let non_monic = Factor {
            poly: Poly::new(&field, values(&[1, 2])),
            multiplicity: 1,
        };
        assert_eq!(
            extract_roots(&field, &[non_monic], 1),
            Err(SolveError::InvalidReconstruction(ReconstructionError::NonLinearFactor {
                degree: 1
            }))
        );
    }

    #[test]
    fn test_extract_roots_count_mismatch() {
        let field = field(P);
        assert_eq!(
            extract_roots(&field, &[linear_factor(3, 1), linear_factor(4, 1)], 3),
            Err(SolveError::InvalidReconstruction(ReconstructionError::RootCountMismatch {
                found: 2,
                expected: 3
            }))
        );
        assert_eq!(
            extract_roots(&field, &[], 2).unwrap_err().kind(),
            ErrorKind::InvalidReconstruction
        );
    }

    #[test]
    fn test_solve_small() {
        let roots = Solver::new().solve(3, &n(P), &values(&[14, 78, 72])).unwrap();
        assert_eq!(roots, values(&[2, 5, 7]));
    }

    #[test]
    fn test_solve_irreducible() {
        // x^2 - 2 has no roots mod 101
        let err = Solver::new().solve(2, &n(P), &values(&[0, 4])).unwrap_err();
        assert_eq!(
            err,
            SolveError::InvalidReconstruction(ReconstructionError::NonLinearFactor { degree: 2 })
        );
    }

    #[test]
    fn test_solve_with_fixed_factorizer() {
        let solver = Solver::with_factorizer(FixedFactorizer(vec![linear_factor(5, 2)]));
        assert_eq!(solver.solve(2, &n(P), &values(&[0, 0])).unwrap(), values(&[5, 5]));
        let err = solver.solve(3, &n(P), &values(&[0, 0, 0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReconstruction);
    }

    #[test]
    fn test_solve_decimal() {
        let solver = Solver::new();
        assert_eq!(
            solver.solve_decimal(3, "101", &["14", "78", "72"]).unwrap(),
            vec!["2", "5", "7"]
        );
        // sums at or above p are reduced
        assert_eq!(
            solver.solve_decimal(3, "101", &["115", "78", "476"]).unwrap(),
            vec!["2", "5", "7"]
        );
    }

    #[test]
    fn test_solve_decimal_malformed() {
        let solver = Solver::new();
        for prime in ["", "0x65", "-101", "1 01", "1_01", "+101", "abc"] {
            let err = solver.solve_decimal(3, prime, &["14", "78", "72"]).unwrap_err();
            assert_eq!(err, SolveError::Input(InputError::MalformedNumeral(prime.to_string())));
        }
        let err = solver.solve_decimal(3, "101", &["14", "7.8", "72"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        // -87 is 14 mod 101, but signed sums are not accepted
        let err = solver.solve_decimal(3, "101", &["-87", "78", "72"]).unwrap_err();
        assert_eq!(err, SolveError::Input(InputError::MalformedNumeral("-87".to_string())));
    }

    #[test]
    fn test_solve_decimal_leading_zeros() {
        let solver = Solver::new();
        assert_eq!(
            solver.solve_decimal(3, "0101", &["014", "78", "0072"]).unwrap(),
            vec!["2", "5", "7"]
        );
    }

    #[test]
    fn test_solve_decimal_catches_panic() {
        let solver = Solver::with_factorizer(PanickingFactorizer);
        let err = solver.solve_decimal(3, "101", &["14", "78", "72"]).unwrap_err();
        assert_eq!(err, SolveError::Internal("scratch space exhausted".to_string()));
    }

    #[test]
    fn test_solve_u64() {
        const R1: u64 = 3616712547;
        const R2: u64 = 2333013068;
        const R3: u64 = 2305843009213693950;
        let field = field(DICEMIX_PRIME_U64);
        let sums: Vec<u64> = PowerSums::from_values(&field, &values(&[R3, R1, R2, R1]), 4)
            .into_inner()
            .iter()
            .map(|sum| sum.to_u64().unwrap())
            .collect();
        assert_eq!(Solver::new().solve_u64(&sums).unwrap(), vec![R2, R1, R1, R3]);
    }
}
