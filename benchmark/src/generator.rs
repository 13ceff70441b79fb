use num_bigint::{BigUint, RandBigInt};
use psum_solver::arithmetic::PrimeField;
use psum_solver::PowerSums;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct LoadGenerator {
    /// The hidden values of all contributors, each in the range [0, p).
    pub values: Vec<BigUint>,
    /// Each contributor's own power sums over `values.len()` powers.
    contributions: Vec<PowerSums>,
    /// Whether one contributor's first power sum is off by one.
    pub malicious: bool,
    /// The current contributor.
    index: usize,
}

impl LoadGenerator {
    /// Create a load generator for `count` values split among
    /// `contributors` peers.
    ///
    /// Every peer gets at least one value. If `malicious`, a randomly chosen
    /// peer adds one to its first power sum, so that the combined aggregate
    /// no longer matches `values`. The iterator yields each peer's
    /// contribution in turn.
    pub fn new(
        field: &PrimeField,
        count: usize,
        contributors: usize,
        malicious: bool,
        seed: u64,
    ) -> Self {
        assert!((1..=count).contains(&contributors));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let values: Vec<BigUint> = (0..count)
            .map(|_| rng.gen_biguint_below(field.modulus()))
            .collect();

        // Split points for contributor boundaries
        let mut bounds: Vec<usize> = (1..count).collect();
        bounds.shuffle(&mut rng);
        bounds.truncate(contributors - 1);
        bounds.push(0);
        bounds.push(count);
        bounds.sort();
        let mut contributions: Vec<PowerSums> = bounds
            .windows(2)
            .map(|w| PowerSums::from_values(field, &values[w[0]..w[1]], count))
            .collect();

        if malicious {
            let i = rng.gen_range(0..contributors);
            let mut sums = contributions[i].clone().into_inner();
            sums[0] = field.add(&sums[0], &BigUint::from(1u32));
            contributions[i] = PowerSums::new(sums);
        }

        Self {
            values,
            contributions,
            malicious,
            index: 0,
        }
    }
}

impl Iterator for LoadGenerator {
    type Item = PowerSums;

    fn next(&mut self) -> Option<Self::Item> {
        let contribution = self.contributions.get(self.index)?.clone();
        self.index += 1;
        Some(contribution)
    }
}
