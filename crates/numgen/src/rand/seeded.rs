use crate::RandSource;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// A `RandSource` backed by a single seeded [`StdRng`].
///
/// The generator sits behind a mutex so it can be shared by every producer.
/// The sequence of draws is reproducible for a given seed, although which
/// producer receives which draw still depends on scheduling.
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

impl RandSource for SeededRandom {
    fn range(&self, low: i32, high: i32) -> i32 {
        self.rng.lock().random_range(low..high)
    }
}
