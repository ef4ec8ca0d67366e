use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parent id of top-level models. Never handed out by [`IdAllocator`].
pub const ROOT_ID: i64 = 0;

/// Hands out object ids for one encoding run.
///
/// Ids are drawn at random from the positive `i64` range rather than counted, so
/// documents written by independent runs do not share ids. Every issued id is
/// remembered and a colliding draw is redrawn.
pub struct IdAllocator {
    rng: StdRng,
    issued: HashSet<i64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            issued: HashSet::new(),
        }
    }

    /// Allocator with a fixed seed. The sequence of ids is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            issued: HashSet::new(),
        }
    }

    pub fn new_id(&mut self) -> i64 {
        loop {
            let id = self.rng.gen_range(1..=i64::MAX);
            if self.issued.insert(id) {
                return id;
            }
        }
    }

    pub fn num_issued(&self) -> usize {
        self.issued.len()
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
