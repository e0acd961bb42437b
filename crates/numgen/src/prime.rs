/// Returns `true` if `n` is prime.
///
/// Primality is only defined for integers `>= 2`, so zero, one and every
/// negative input are reported as not prime. Candidates of the form `6k ± 1`
/// are trial-divided up to `⌊√n⌋`.
///
/// # Example
/// ```
/// use numgen::is_prime;
///
/// assert!(is_prime(97));
/// assert!(!is_prime(100));
/// assert!(!is_prime(-7));
/// ```
#[must_use]
pub const fn is_prime(n: i32) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    // Widened so `i * i` cannot overflow near `i32::MAX`.
    let n = n as i64;
    let mut i = 5_i64;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}
