//! Coordination of one generation run.
//!
//! [`ProducerOrchestrator`] owns the run's [`SharedNumberBuffer`] and its
//! [`CancellationToken`]. A run launches three producers on the tokio
//! blocking pool:
//!
//! - odd values,
//! - negated primes,
//! - even values, gated until the buffer reaches its threshold.
//!
//! It waits for all three to exit, sorts the buffer once, and reports the
//! final [`NumberCounts`]. [`ProducerOrchestrator::save`] then hands the
//! classified result to a [`NumberStore`].

mod producer;
mod state;

pub use state::*;

use crate::{
    Error, GenerationConfig, NumberCounts, NumberGenerator, NumberStore, RandSource, Result,
    SharedNumberBuffer, ThreadRandom,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tokio_util::sync::CancellationToken;

/// Runs the producers of a generation cycle and persists the result.
///
/// The orchestrator can be shared (e.g. in an [`Arc`]) so that another task
/// can observe progress or [`cancel`](Self::cancel) a run while
/// [`start`](Self::start) is being awaited.
///
/// # Example
/// ```
/// use numgen::{GenerationConfig, ProducerOrchestrator};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let config = GenerationConfig::new(1_000, 250, 10_000).unwrap();
/// let orchestrator = ProducerOrchestrator::new(config);
///
/// let counts = orchestrator.start().await.unwrap();
/// assert_eq!(counts.total, 1_000);
/// assert_eq!(counts.odd + counts.even + counts.prime, 1_000);
/// # });
/// ```
pub struct ProducerOrchestrator<R = ThreadRandom> {
    config: GenerationConfig,
    generator: Arc<NumberGenerator<R>>,
    buffer: Mutex<Arc<SharedNumberBuffer>>,
    state: Mutex<RunState>,
    token: Mutex<CancellationToken>,
}

impl ProducerOrchestrator<ThreadRandom> {
    /// Creates an orchestrator drawing from the thread-local RNG.
    pub fn new(config: GenerationConfig) -> Self {
        Self::with_rand(config, ThreadRandom)
    }
}

impl Default for ProducerOrchestrator<ThreadRandom> {
    fn default() -> Self {
        Self::new(GenerationConfig::default())
    }
}

impl<R> ProducerOrchestrator<R>
where
    R: RandSource + 'static,
{
    /// Creates an orchestrator whose producers share `rng`.
    pub fn with_rand(config: GenerationConfig, rng: R) -> Self {
        Self {
            generator: Arc::new(NumberGenerator::new(rng, config.upper_bound())),
            buffer: Mutex::new(Arc::new(Self::empty_buffer(&config))),
            state: Mutex::new(RunState::Idle),
            token: Mutex::new(CancellationToken::new()),
            config,
        }
    }

    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        *self.state.lock()
    }

    /// The buffer of the current (or last) run.
    pub fn buffer(&self) -> Arc<SharedNumberBuffer> {
        Arc::clone(&self.buffer.lock())
    }

    /// Number of values appended so far. Usable as a progress reading while
    /// a run is in flight.
    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    pub fn counts(&self) -> NumberCounts {
        self.buffer().counts()
    }

    pub fn odd_count(&self) -> usize {
        self.counts().odd
    }

    pub fn even_count(&self) -> usize {
        self.counts().even
    }

    pub fn prime_count(&self) -> usize {
        self.counts().prime
    }

    /// Zero until a run completes.
    pub fn total_count(&self) -> usize {
        self.counts().total
    }

    /// Cooperatively stops the current run.
    ///
    /// Values already appended are kept; the run still sorts and completes.
    /// Cancelling twice, or with no run in flight, has no effect.
    pub fn cancel(&self) {
        let _state = self.state.lock();
        self.token.lock().cancel();
    }

    /// Runs one full generation cycle.
    ///
    /// Resets the counters with a fresh buffer, launches the three producers,
    /// waits for all of them, sorts the values ascending and returns the
    /// final counts.
    ///
    /// If the returned future is dropped before completion, the run is
    /// cancelled and the orchestrator returns to [`RunState::Idle`].
    ///
    /// # Errors
    ///
    /// - [`Error::RunInProgress`] if another run is `Running` or `Sorting`.
    /// - [`Error::Task`] if a producer panicked.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(self)))]
    pub async fn start(&self) -> Result<NumberCounts> {
        let token = self.begin_run()?;
        let mut guard = RunGuard {
            orchestrator: self,
            token: token.clone(),
            completed: false,
        };

        let buffer = Arc::new(Self::empty_buffer(&self.config));
        *self.buffer.lock() = Arc::clone(&buffer);

        #[cfg(feature = "tracing")]
        tracing::info!(
            total_limit = self.config.total_limit(),
            even_threshold = self.config.even_threshold(),
            upper_bound = self.generator.upper_bound(),
            "Starting number generation"
        );

        // Whichever way the odd or prime loop exits, including a panic, the
        // run token is cancelled so a gate still waiting for the threshold
        // cannot outlive it.
        let odd = spawn_blocking({
            let (buffer, generator, token) = self.producer_handles(&buffer, &token);
            move || {
                let _stop_run = token.clone().drop_guard();
                producer::produce_odd(&buffer, &generator, &token)
            }
        });
        let prime = spawn_blocking({
            let (buffer, generator, token) = self.producer_handles(&buffer, &token);
            move || {
                let _stop_run = token.clone().drop_guard();
                producer::produce_negated_primes(&buffer, &generator, &token)
            }
        });
        let even = tokio::spawn({
            let (buffer, generator, token) = self.producer_handles(&buffer, &token);
            producer::gate_even(buffer, generator, token)
        });

        let (odd, prime, even) = tokio::join!(odd, prime, even);
        let (_odd, _prime, _even) = (odd?, prime?, even??);

        #[cfg(feature = "tracing")]
        tracing::info!(
            odd = _odd,
            prime = _prime,
            even = _even,
            "All threads have finished. Sorting the final list"
        );

        *self.state.lock() = RunState::Sorting;
        let counts = spawn_blocking(move || buffer.finish()).await?;
        *self.state.lock() = RunState::Completed;
        guard.completed = true;

        #[cfg(feature = "tracing")]
        tracing::info!(
            total = counts.total,
            odd = counts.odd,
            even = counts.even,
            prime = counts.prime,
            "Summary"
        );

        Ok(counts)
    }

    /// Persists the result of the last completed run.
    ///
    /// Each value is classified with [`is_prime`](crate::is_prime) in
    /// parallel and the batch is forwarded to [`NumberStore::save_all`].
    /// Returns the number of records handed to the store. An empty buffer
    /// is not saved at all and yields `Ok(0)`.
    ///
    /// The in-memory buffer is never modified, so a failed save can be
    /// retried by the caller.
    ///
    /// # Errors
    ///
    /// - [`Error::RunInProgress`] while a run is `Running` or `Sorting`.
    /// - [`Error::Task`] if classification panicked.
    /// - [`Error::Persistence`] carrying the store's error, unmodified.
    pub async fn save<S>(&self, store: &S) -> Result<usize, Error<S::Error>>
    where
        S: NumberStore,
    {
        if self.state().is_active() {
            return Err(Error::RunInProgress);
        }

        let buffer = self.buffer();
        if buffer.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!("No numbers to save. Run a generation cycle first");
            return Ok(0);
        }

        #[cfg(feature = "tracing")]
        tracing::info!(count = buffer.len(), "Saving numbers");

        let records = spawn_blocking(move || buffer.classify()).await?;

        if let Err(e) = store.save_all(&records).await {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %e, "Failed to save numbers");
            return Err(Error::Persistence(e));
        }

        #[cfg(feature = "tracing")]
        tracing::info!(saved = records.len(), "Saved numbers");

        Ok(records.len())
    }

    fn begin_run(&self) -> Result<CancellationToken> {
        let mut state = self.state.lock();
        if state.is_active() {
            return Err(Error::RunInProgress);
        }
        // Swapped under the state lock so a concurrent `cancel` reaches
        // either the old run or this one, never neither.
        let token = CancellationToken::new();
        *self.token.lock() = token.clone();
        *state = RunState::Running;
        Ok(token)
    }

    fn producer_handles(
        &self,
        buffer: &Arc<SharedNumberBuffer>,
        token: &CancellationToken,
    ) -> (
        Arc<SharedNumberBuffer>,
        Arc<NumberGenerator<R>>,
        CancellationToken,
    ) {
        (
            Arc::clone(buffer),
            Arc::clone(&self.generator),
            token.clone(),
        )
    }

    fn empty_buffer(config: &GenerationConfig) -> SharedNumberBuffer {
        SharedNumberBuffer::new(config.total_limit(), config.even_threshold())
    }
}

/// Rolls an unfinished run back to `Idle`.
///
/// Armed for the duration of [`ProducerOrchestrator::start`]. If the run
/// does not reach `Completed` (a producer failed or the future was dropped),
/// the producers are cancelled and the partial buffer is discarded.
struct RunGuard<'a, R>
where
    R: RandSource + 'static,
{
    orchestrator: &'a ProducerOrchestrator<R>,
    token: CancellationToken,
    completed: bool,
}

impl<R> Drop for RunGuard<'_, R>
where
    R: RandSource + 'static,
{
    fn drop(&mut self) {
        if self.completed {
            return;
        }

        self.token.cancel();
        let orchestrator = self.orchestrator;
        *orchestrator.buffer.lock() = Arc::new(ProducerOrchestrator::<R>::empty_buffer(
            &orchestrator.config,
        ));
        *orchestrator.state.lock() = RunState::Idle;

        #[cfg(feature = "tracing")]
        tracing::warn!("Generation run abandoned before completion");
    }
}
