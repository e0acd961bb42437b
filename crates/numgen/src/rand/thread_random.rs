use crate::RandSource;
use rand::{Rng, rng};

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// Each OS thread has its own RNG instance, so calls from multiple producers
/// are contention-free and safe. This type does **not** store the RNG itself;
/// it simply accesses the thread-local generator on each call.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn range(&self, low: i32, high: i32) -> i32 {
        rng().random_range(low..high)
    }
}
