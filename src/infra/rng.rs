use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::engine::RandomSource;

/// RNG на основе `thread_rng` для обычной игры.
#[derive(Clone, Debug, Default)]
pub struct SystemRng;

impl RandomSource for SystemRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut rand::thread_rng());
    }

    fn next_in_range(&mut self, low: u8, high: u8) -> u8 {
        rand::thread_rng().gen_range(low..=high)
    }
}

/// Детерминированный RNG для тестов и реплея.
/// Позволяет воспроизводить одни и те же раздачи при одинаковом seed.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: rand::rngs::StdRng,
}

impl DeterministicRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for DeterministicRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    fn next_in_range(&mut self, low: u8, high: u8) -> u8 {
        self.inner.gen_range(low..=high)
    }
}
