//! Random number sources threaded through every randomized operation.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Producer of uniformly distributed integers.
pub trait RandomSource {
    /// Returns an integer in `lo..=hi`. Returns `lo` when the range is empty.
    fn next_in_range(&mut self, lo: i32, hi: i32) -> i32;
}

/// Seedable source backed by ChaCha8, reproducible across platforms.
#[derive(Clone, Debug)]
pub struct ChaChaSource {
    rng: ChaCha8Rng,
}

impl ChaChaSource {
    /// Creates a source whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for ChaChaSource {
    fn next_in_range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}

/// Replays a scripted list of values, clamping each into the requested range.
///
/// Once the script runs out every draw yields the lower bound.
#[derive(Clone, Debug, Default)]
pub struct SequenceSource {
    values: VecDeque<i32>,
}

impl SequenceSource {
    /// Creates a source that replays `values` in order.
    #[must_use]
    pub fn new(values: Vec<i32>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// Number of scripted values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for SequenceSource {
    fn next_in_range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        match self.values.pop_front() {
            Some(value) => value.clamp(lo, hi),
            None => lo,
        }
    }
}
