use crate::{RandSource, ThreadRandom, UPPER_BOUND, is_prime};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Number of draws [`NumberGenerator::generate_random_prime`] makes before
/// giving up.
pub const MAX_PRIME_ATTEMPTS: usize = 1000;

/// Value returned when no prime turned up within [`MAX_PRIME_ATTEMPTS`].
pub const FALLBACK_PRIME: i32 = 2;

/// Stateless random number generator restricted to the shapes the producers
/// need: any value, odd values, even values and primes.
///
/// The generator owns no mutable state of its own; all randomness comes from
/// the injected [`RandSource`], so a single instance can be shared by every
/// producer of a run.
///
/// # Example
/// ```
/// use numgen::{NumberGenerator, ThreadRandom};
///
/// let generator = NumberGenerator::new(ThreadRandom, 1_000);
/// assert_eq!(generator.generate_odd() % 2, 1);
/// assert_eq!(generator.generate_even() % 2, 0);
/// ```
#[derive(Debug, Clone)]
pub struct NumberGenerator<R = ThreadRandom> {
    rng: R,
    upper_bound: i32,
}

impl<R: RandSource> NumberGenerator<R> {
    /// Creates a generator drawing magnitudes below `upper_bound`.
    ///
    /// `upper_bound` must be at least 2; [`GenerationConfig`] enforces this.
    ///
    /// [`GenerationConfig`]: crate::GenerationConfig
    pub const fn new(rng: R, upper_bound: i32) -> Self {
        Self { rng, upper_bound }
    }

    pub const fn upper_bound(&self) -> i32 {
        self.upper_bound
    }

    /// Uniform over `[1, upper_bound)`.
    pub fn generate_random(&self) -> i32 {
        self.rng.range(1, self.upper_bound)
    }

    /// Uniform even value in `[0, upper_bound)`.
    pub fn generate_even(&self) -> i32 {
        2 * self.rng.range(0, self.upper_bound / 2)
    }

    /// Uniform odd value in `[0, upper_bound)`.
    pub fn generate_odd(&self) -> i32 {
        2 * self.rng.range(0, self.upper_bound / 2) + 1
    }

    /// Draws [`Self::generate_random`] until a prime comes up.
    ///
    /// A random search over a finite domain has no termination guarantee, so
    /// the search is capped at [`MAX_PRIME_ATTEMPTS`] draws, after which
    /// [`FALLBACK_PRIME`] is returned. The function is therefore total.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate_random_prime(&self) -> i32 {
        (0..MAX_PRIME_ATTEMPTS)
            .map(|_| self.generate_random())
            .find(|&candidate| is_prime(candidate))
            .unwrap_or(FALLBACK_PRIME)
    }
}

impl Default for NumberGenerator<ThreadRandom> {
    fn default() -> Self {
        Self::new(ThreadRandom, UPPER_BOUND)
    }
}
