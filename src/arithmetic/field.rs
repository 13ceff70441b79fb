use num_bigint::BigUint;
use num_traits::Zero;

/// The integers modulo `p`.
///
/// Elements are plain [BigUint] residues in `[0, p)`. Every operation
/// accepts unreduced operands and returns a reduced result. The modulus is
/// assumed to be prime; nothing here checks it, and [PrimeField::inv]
/// returns `None` where a composite modulus has no inverse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimeField {
    modulus: BigUint,
}

impl PrimeField {
    /// Returns `None` if the modulus is less than 2.
    pub fn new(modulus: BigUint) -> Option<Self> {
        if modulus < BigUint::from(2u32) {
            return None;
        }
        Some(Self { modulus })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn reduce(&self, a: &BigUint) -> BigUint {
        a % &self.modulus
    }

    pub fn from_u64(&self, a: u64) -> BigUint {
        self.reduce(&BigUint::from(a))
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.modulus
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let a = self.reduce(a);
        let b = self.reduce(b);
        if a >= b {
            a - b
        } else {
            &self.modulus - (b - a)
        }
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        let a = self.reduce(a);
        if a.is_zero() {
            a
        } else {
            &self.modulus - a
        }
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    pub fn pow(&self, a: &BigUint, exp: &BigUint) -> BigUint {
        a.modpow(exp, &self.modulus)
    }

    /// The modular multiplicative inverse. `None` if `a` shares a factor
    /// with the modulus.
    pub fn inv(&self, a: &BigUint) -> Option<BigUint> {
        let a = self.reduce(a);
        if a.is_zero() {
            return None;
        }
        a.modinv(&self.modulus)
    }
}
