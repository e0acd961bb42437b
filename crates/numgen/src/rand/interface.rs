/// A trait for random sources that return uniformly distributed integers.
///
/// This abstraction allows you to plug in a real random source or a mocked
/// random source in tests. Implementations are shared by every producer of a
/// run, so they must be callable concurrently through `&self`.
///
/// # Example
/// ```
/// use numgen::RandSource;
///
/// struct FixedRand;
/// impl RandSource for FixedRand {
///     fn range(&self, low: i32, _high: i32) -> i32 {
///         low
///     }
/// }
///
/// let rng = FixedRand;
/// assert_eq!(rng.range(4, 10), 4);
/// ```
pub trait RandSource: Send + Sync {
    /// Returns an integer drawn uniformly from `[low, high)`.
    ///
    /// Callers guarantee `low < high`.
    fn range(&self, low: i32, high: i32) -> i32;
}

impl<R: RandSource + ?Sized> RandSource for &R {
    fn range(&self, low: i32, high: i32) -> i32 {
        (**self).range(low, high)
    }
}
