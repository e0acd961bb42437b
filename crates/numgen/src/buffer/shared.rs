use crate::{Category, Number, NumberCounts};
use core::fmt;
use parking_lot::Mutex;
use rayon::prelude::*;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct BufferState {
    values: Vec<i32>,
    counts: NumberCounts,
    /// Buffer length at the moment each category was first appended.
    first_positions: [Option<usize>; 3],
}

/// A capacity-bounded, append-only sequence of integers shared by every
/// producer of a run.
///
/// The values and the category counters live behind a single lock, so a
/// length check, the append and the counter increment form one critical
/// section. This is what makes the capacity exact under contention and keeps
/// `odd + even + prime == len` true at every observation.
///
/// The buffer also owns the *threshold notification*: the append that brings
/// the length to `threshold` wakes everything parked in
/// [`Self::wait_for_threshold`].
pub struct SharedNumberBuffer {
    state: Mutex<BufferState>,
    capacity: usize,
    threshold: usize,
    threshold_reached: Notify,
}

impl SharedNumberBuffer {
    /// Creates an empty buffer holding at most `capacity` values, whose gate
    /// opens once `threshold` values have been appended.
    pub fn new(capacity: usize, threshold: usize) -> Self {
        Self {
            state: Mutex::new(BufferState::default()),
            capacity,
            threshold,
            threshold_reached: Notify::new(),
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.state.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().values.is_empty()
    }

    pub fn counts(&self) -> NumberCounts {
        self.state.lock().counts
    }

    /// Returns the buffer length at the time `category` was first appended,
    /// or `None` if it never was.
    ///
    /// For the even category this is never below [`Self::threshold`] when
    /// evens are only produced behind [`Self::wait_for_threshold`].
    pub fn first_position(&self, category: Category) -> Option<usize> {
        self.state.lock().first_positions[category.index()]
    }

    /// Appends the value produced by `value_fn` unless the buffer is full.
    ///
    /// `value_fn` is only evaluated once room has been confirmed, and it runs
    /// inside the critical section. Returns `false` when the buffer is at
    /// capacity; that is the signal for a producer to stop, not an error.
    pub fn try_append<F>(&self, value_fn: F, category: Category) -> bool
    where
        F: FnOnce() -> i32,
    {
        let len = {
            let mut state = self.state.lock();
            let position = state.values.len();
            if position >= self.capacity {
                return false;
            }

            let value = value_fn();
            state.values.push(value);
            state.counts.increment(category);
            state.first_positions[category.index()].get_or_insert(position);
            position + 1
        };

        if len == self.threshold {
            self.threshold_reached.notify_waiters();
        }

        true
    }

    /// Waits until the buffer holds at least [`Self::threshold`] values.
    ///
    /// Returns `true` once the threshold is met, or `false` if `token` is
    /// cancelled first. The notification is armed before the length is
    /// checked, so a threshold crossed between the check and the wait is not
    /// missed. The gate may therefore open slightly late, never early.
    pub async fn wait_for_threshold(&self, token: &CancellationToken) -> bool {
        loop {
            let notified = self.threshold_reached.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.len() >= self.threshold {
                return true;
            }

            tokio::select! {
                () = notified => {}
                () = token.cancelled() => return false,
            }
        }
    }

    /// Sorts the values ascending and records `total`.
    ///
    /// Called once per run, after every producer has exited.
    pub fn finish(&self) -> NumberCounts {
        let mut state = self.state.lock();
        state.values.par_sort_unstable();
        state.counts.total = state.values.len();
        state.counts
    }

    /// Point-in-time copy of the values.
    pub fn snapshot(&self) -> Vec<i32> {
        self.state.lock().values.clone()
    }

    /// Maps every value to a [`Number`] record, in buffer order.
    ///
    /// Classification is a pure per-element function, so it is spread over
    /// the rayon pool while the lock is held.
    pub fn classify(&self) -> Vec<Number> {
        let state = self.state.lock();
        state
            .values
            .par_iter()
            .map(|&value| Number::classify(value))
            .collect()
    }
}

impl fmt::Debug for SharedNumberBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SharedNumberBuffer")
            .field("len", &state.values.len())
            .field("capacity", &self.capacity)
            .field("threshold", &self.threshold)
            .field("counts", &state.counts)
            .finish()
    }
}
