//! Uniform random selection of the next background.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Pool;

/// Picks backgrounds out of a [`Pool`] uniformly at random.
#[derive(Debug, Clone)]
pub struct Picker {
    rng: StdRng,
}

impl Picker {
    /// Creates a picker seeded from the thread-local generator.
    #[must_use]
    pub fn new() -> Self { Self { rng: StdRng::from_rng(&mut rand::rng()) } }

    /// Creates a picker with a fixed seed, for reproducible selection.
    #[must_use]
    pub fn seeded(seed: u64) -> Self { Self { rng: StdRng::seed_from_u64(seed) } }

    /// Removes one candidate from the pool and returns it.
    ///
    /// Every remaining candidate is equally likely. Returns `None` if the pool
    /// is empty; callers refill before picking.
    pub fn pick(&mut self, pool: &mut Pool) -> Option<PathBuf> {
        if pool.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..pool.len());
        pool.take(index)
    }
}

impl Default for Picker {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    fn pool_of(names: &[&str]) -> Pool {
        let mut pool = Pool::new();
        pool.refill(names.iter().map(PathBuf::from).collect());
        pool
    }

    #[test]
    fn test_pick_from_empty_pool_returns_none() {
        let mut picker = Picker::seeded(1);
        let mut pool = Pool::new();
        assert_eq!(picker.pick(&mut pool), None);
    }

    #[test]
    fn test_pick_never_repeats_within_a_cycle() {
        let mut picker = Picker::seeded(7);
        let mut pool = pool_of(&["a", "b", "c", "d", "e"]);

        let mut seen = HashSet::new();
        while let Some(candidate) = picker.pick(&mut pool) {
            assert!(seen.insert(candidate), "candidate returned twice");
        }
        assert_eq!(seen.len(), 5);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_seeded_pickers_agree() {
        let mut first = Picker::seeded(42);
        let mut second = Picker::seeded(42);
        let mut pool_a = pool_of(&["a", "b", "c", "d"]);
        let mut pool_b = pool_of(&["a", "b", "c", "d"]);

        for _ in 0..4 {
            assert_eq!(first.pick(&mut pool_a), second.pick(&mut pool_b));
        }
    }

    #[test]
    fn test_pick_is_roughly_uniform() {
        let mut picker = Picker::seeded(3);
        let mut counts: HashMap<PathBuf, u32> = HashMap::new();

        for _ in 0..3000 {
            let mut pool = pool_of(&["a", "b", "c"]);
            let first = picker.pick(&mut pool).unwrap();
            *counts.entry(first).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        for count in counts.values() {
            assert!((800..=1200).contains(count), "skewed selection: {counts:?}");
        }
    }
}
