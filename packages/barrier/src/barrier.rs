//! Counting barrier released by a fixed number of completion signals.
//!
//! The barrier moves through a single one-way transition: it is pending while completions
//! are outstanding and satisfied once the last one arrives. It is never re-armed.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Error returned from [`CompletionBarrier::signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// Every expected completion has already been signaled.
    #[error("Barrier signaled more times than its count")]
    ExcessSignal,
}

/// Blocks waiters until a fixed number of tasks have signaled completion.
///
/// Clones share the same barrier, so a clone can be handed to every task.
///
/// # Examples
///
/// ```rust
/// use handoff_barrier::{CompletionBarrier, SignalError};
///
/// let barrier = CompletionBarrier::new(2);
/// barrier.signal().unwrap();
/// assert_eq!(barrier.remaining(), 1);
///
/// barrier.signal().unwrap();
/// barrier.wait();
///
/// assert_eq!(barrier.signal(), Err(SignalError::ExcessSignal));
/// ```
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    inner: Arc<BarrierInner>,
}

#[derive(Debug)]
struct BarrierInner {
    count: usize,
    remaining: Mutex<usize>,
    released: Condvar,
    #[cfg(feature = "async")]
    released_notify: tokio::sync::Notify,
}

impl BarrierInner {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CompletionBarrier {
    /// Creates a barrier that waits for `count` completion signals.
    ///
    /// A `count` of `0` creates a barrier that is already satisfied.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(BarrierInner {
                count,
                remaining: Mutex::new(count),
                released: Condvar::new(),
                #[cfg(feature = "async")]
                released_notify: tokio::sync::Notify::new(),
            }),
        }
    }

    /// Records one completion.
    ///
    /// The signal that brings the outstanding count to zero releases every current waiter,
    /// and every later [`CompletionBarrier::wait`] returns immediately.
    ///
    /// # Errors
    ///
    /// * Returns `SignalError::ExcessSignal` if every expected completion was already signaled
    pub fn signal(&self) -> Result<(), SignalError> {
        let mut remaining = self.inner.lock();
        let Some(next) = remaining.checked_sub(1) else {
            log::debug!(
                "signal: barrier of {} already satisfied, rejecting signal",
                self.inner.count
            );
            return Err(SignalError::ExcessSignal);
        };
        *remaining = next;
        drop(remaining);

        if next == 0 {
            log::debug!(
                "signal: all {} completions signaled, releasing waiters",
                self.inner.count
            );
            self.inner.released.notify_all();
            #[cfg(feature = "async")]
            self.inner.released_notify.notify_waiters();
        } else {
            log::trace!("signal: {next} completions remaining");
        }

        Ok(())
    }

    /// Blocks the current thread until every completion has been signaled.
    pub fn wait(&self) {
        let remaining = self.inner.lock();
        if *remaining > 0 {
            log::trace!("wait: waiting for {} completions", *remaining);
        }
        drop(
            self.inner
                .released
                .wait_while(remaining, |remaining| *remaining > 0)
                .unwrap_or_else(PoisonError::into_inner),
        );
    }

    /// Suspends the current task until every completion has been signaled.
    #[cfg(feature = "async")]
    pub async fn wait_async(&self) {
        loop {
            let notified = self.inner.released_notify.notified();
            let remaining = self.remaining();
            if remaining == 0 {
                return;
            }
            log::trace!("wait_async: waiting for {remaining} completions");
            notified.await;
        }
    }

    /// The number of completions the barrier was created with.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.count
    }

    /// The number of completions still outstanding.
    #[must_use]
    pub fn remaining(&self) -> usize {
        *self.inner.lock()
    }

    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.remaining() == 0
    }
}
