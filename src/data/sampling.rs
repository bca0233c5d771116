use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use std::sync::Mutex;

/// Source of randomness for store-native sampling.
pub trait RandomSource: Send + Sync {
    /// Distinct indices from `0..len`, at most `amount` of them, in random order.
    fn sample_indices(&self, len: usize, amount: usize) -> Vec<usize>;
}

/// Thread-local entropy; concurrent callers never contend on a lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn sample_indices(&self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut rand::thread_rng(), len, amount.min(len)).into_vec()
    }
}

/// Reproducible sampling from a fixed seed.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn sample_indices(&self, len: usize, amount: usize) -> Vec<usize> {
        // A panic elsewhere cannot leave the RNG in an invalid state.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        index::sample(&mut *rng, len, amount.min(len)).into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_indices_are_distinct_and_bounded() {
        let source = ThreadRandom;
        for _ in 0..50 {
            let picked = source.sample_indices(10, 4);
            assert_eq!(picked.len(), 4);
            assert!(picked.iter().all(|&i| i < 10));
            assert_eq!(picked.iter().collect::<HashSet<_>>().len(), 4);
        }
    }

    #[test]
    fn test_amount_larger_than_len_is_truncated() {
        assert_eq!(ThreadRandom.sample_indices(2, 5).len(), 2);
        assert!(SeededRandom::new(1).sample_indices(0, 3).is_empty());
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        for _ in 0..5 {
            assert_eq!(a.sample_indices(100, 3), b.sample_indices(100, 3));
        }
    }
}
