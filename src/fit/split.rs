//! Deterministic train/test split.
//!
//! Row indices are shuffled with a seeded `StdRng`; the first `ceil(n * test_fraction)`
//! shuffled indices form the test set and the rest the training set. The same `n`,
//! fraction, and seed always give the same partition.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> SplitIndices {
    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    // Keep at least one row on each side when there are two or more rows.
    let mut n_test = (n as f64 * test_fraction).ceil() as usize;
    if n >= 2 {
        n_test = n_test.clamp(1, n - 1);
    } else {
        n_test = 0;
    }

    let train = idx.split_off(n_test);
    SplitIndices { train, test: idx }
}
