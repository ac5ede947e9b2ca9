//! Reproducible train/test split
//!
//! Seed and ratio are fixed so metric regressions between runs on the
//! same data are real regressions.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Share of rows held out for evaluation, in percent.
pub const TEST_PERCENT: usize = 20;
pub const SPLIT_SEED: u64 = 42;
/// One row to fit, one to evaluate.
pub const MIN_USABLE_ROWS: usize = 2;

/// Row indices of each side of the split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded ChaCha permutation and hold out
/// `ceil(n * TEST_PERCENT / 100)` rows.
pub fn train_test_split(n: usize, seed: u64) -> Split {
    let n_test = (n * TEST_PERCENT).div_ceil(100).min(n);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Split {
        train,
        test: indices,
    }
}
