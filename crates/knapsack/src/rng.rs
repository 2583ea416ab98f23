use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded source of the uniform draws used to synthesise instances.
#[derive(Clone, Debug)]
pub struct InstanceRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl InstanceRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed from entropy. The chosen seed is kept so the corpus can be replayed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw from an inclusive range.
    pub fn between(&mut self, range: &RangeInclusive<u64>) -> u64 {
        self.inner.random_range(range.clone())
    }
}
