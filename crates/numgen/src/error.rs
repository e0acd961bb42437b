use core::convert::Infallible;
use tokio::task::JoinError;

/// A result type whose error defaults to [`Error`] without a persistence
/// payload.
///
/// Generation is infallible apart from configuration and task failures, so
/// most APIs return `Result<T>`. Only [`ProducerOrchestrator::save`] carries
/// the store's own error type through `Error<E>`.
///
/// [`ProducerOrchestrator::save`]: crate::ProducerOrchestrator::save
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `numgen` can produce.
///
/// The generic parameter `E` is the error type of the [`NumberStore`] a save
/// was forwarded to. It is only ever constructed in [`Error::Persistence`];
/// every other variant is independent of it.
///
/// Capacity exhaustion and a fruitless prime search are *not* errors: the
/// former ends a producer loop, the latter falls back to [`FALLBACK_PRIME`].
///
/// [`NumberStore`]: crate::NumberStore
/// [`FALLBACK_PRIME`]: crate::FALLBACK_PRIME
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error<E = Infallible> {
    /// The generation parameters cannot describe a terminating run.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A run is already `Running` or `Sorting`.
    #[error("A generation run is already in progress")]
    RunInProgress,

    /// A producer or classification task panicked or was aborted.
    #[error("Background task failed: {0}")]
    Task(#[from] JoinError),

    /// The store rejected the save. Passed through untouched.
    #[error(transparent)]
    Persistence(E),
}
