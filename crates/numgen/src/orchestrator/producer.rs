//! Producer loops of a generation run.
//!
//! Every loop has the same shape: check the run's [`CancellationToken`],
//! attempt one append, stop when the append is refused. The odd and
//! negated-prime loops are spawned directly; the even loop sits behind
//! [`gate_even`], which holds it back until the buffer reaches its threshold
//! and cancels the whole run once it is done.

use crate::{Category, NumberGenerator, RandSource, SharedNumberBuffer};
use std::sync::Arc;
use tokio::task::{JoinError, spawn_blocking};
use tokio_util::sync::CancellationToken;

/// Repeats `step` until it reports a full buffer or `token` is cancelled.
/// Returns the number of successful steps.
fn run_until_full(token: &CancellationToken, mut step: impl FnMut() -> bool) -> usize {
    let mut appended = 0;
    while !token.is_cancelled() {
        if !step() {
            break;
        }
        appended += 1;
    }
    appended
}

pub(crate) fn produce_odd<R: RandSource>(
    buffer: &SharedNumberBuffer,
    generator: &NumberGenerator<R>,
    token: &CancellationToken,
) -> usize {
    #[cfg(feature = "tracing")]
    tracing::info!("Odd number generator started");

    let appended = run_until_full(token, || {
        buffer.try_append(|| generator.generate_odd(), Category::Odd)
    });

    #[cfg(feature = "tracing")]
    tracing::info!(appended, "Odd number generator stopped");
    appended
}

/// The prime search runs outside the buffer lock; only the negation happens
/// inside it.
pub(crate) fn produce_negated_primes<R: RandSource>(
    buffer: &SharedNumberBuffer,
    generator: &NumberGenerator<R>,
    token: &CancellationToken,
) -> usize {
    #[cfg(feature = "tracing")]
    tracing::info!("Prime number generator started");

    let appended = run_until_full(token, || {
        let prime = generator.generate_random_prime();
        buffer.try_append(|| -prime, Category::Prime)
    });

    #[cfg(feature = "tracing")]
    tracing::info!(appended, "Prime number generator stopped");
    appended
}

fn produce_even<R: RandSource>(
    buffer: &SharedNumberBuffer,
    generator: &NumberGenerator<R>,
    token: &CancellationToken,
) -> usize {
    let appended = run_until_full(token, || {
        buffer.try_append(|| generator.generate_even(), Category::Even)
    });

    #[cfg(feature = "tracing")]
    tracing::info!(appended, "Even number generator finished");
    appended
}

/// Waits for the buffer threshold, then runs the even loop on the blocking
/// pool.
///
/// When the even loop ends, for whatever reason, `token` is cancelled so the
/// odd and prime loops stop even if they have not yet seen a full buffer
/// themselves. If the token is cancelled while still waiting, nothing is
/// produced and the gate returns quietly.
pub(crate) async fn gate_even<R>(
    buffer: Arc<SharedNumberBuffer>,
    generator: Arc<NumberGenerator<R>>,
    token: CancellationToken,
) -> Result<usize, JoinError>
where
    R: RandSource + 'static,
{
    if !buffer.wait_for_threshold(&token).await {
        #[cfg(feature = "tracing")]
        tracing::info!("Run cancelled before the even generator was launched");
        return Ok(0);
    }

    #[cfg(feature = "tracing")]
    tracing::info!(
        threshold = buffer.threshold(),
        "Threshold reached. Launching even number generator"
    );

    let even_token = token.clone();
    let appended = spawn_blocking(move || produce_even(&buffer, &generator, &even_token)).await;

    token.cancel();
    appended
}
