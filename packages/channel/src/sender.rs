use std::sync::Arc;

use crate::{
    CloseError, SendError, TrySendError,
    shared::{Push, Shared},
};

/// Sending half of a channel.
///
/// Senders can be cloned freely; every clone feeds the same queue. The channel closes either
/// through an explicit [`Sender::close`] or implicitly when the last sender is dropped.
pub struct Sender<T> {
    shared: Arc<Shared<T>>,
}

impl<T> std::fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender").finish_non_exhaustive()
    }
}

impl<T> Sender<T> {
    pub(crate) const fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Send a value, blocking while the channel is full.
    ///
    /// On a rendezvous channel (capacity 0) this only returns once a receiver has taken the
    /// value.
    ///
    /// # Errors
    ///
    /// * Returns `SendError::Closed` if the channel is closed, or every receiver has been
    ///   dropped, before the value is delivered
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        let mut value = value;
        let mut state = self.shared.lock();

        let ticket = loop {
            match state.push(value) {
                Ok(Push::Buffered) => {
                    drop(state);
                    self.shared.wake_receivers();
                    return Ok(());
                }
                Ok(Push::Handoff(ticket)) => break ticket,
                Err(TrySendError::Full(returned)) => {
                    log::trace!("send: channel full, waiting for space");
                    value = returned;
                    state = self.shared.wait_for_space(state);
                }
                Err(TrySendError::Closed(returned)) => return Err(SendError::Closed(returned)),
            }
        };

        self.shared.wake_receivers();

        loop {
            if let Some(result) = state.handoff_result(ticket) {
                return result;
            }
            log::trace!("send: waiting for a receiver to take handoff {ticket}");
            state = self.shared.wait_for_space(state);
        }
    }

    /// Send a value, suspending the task while the channel is full.
    ///
    /// # Cancel safety
    ///
    /// This method is not cancel safe. Dropping the future while a rendezvous handoff is
    /// pending leaves the value in the channel for a receiver to take.
    ///
    /// # Errors
    ///
    /// * Returns `SendError::Closed` if the channel is closed, or every receiver has been
    ///   dropped, before the value is delivered
    #[cfg(feature = "async")]
    pub async fn send_async(&self, value: T) -> Result<(), SendError<T>> {
        let mut value = value;

        let ticket = loop {
            let notified = self.shared.space_notified();
            let pushed = self.shared.lock().push(value);

            match pushed {
                Ok(Push::Buffered) => {
                    self.shared.wake_receivers();
                    return Ok(());
                }
                Ok(Push::Handoff(ticket)) => {
                    self.shared.wake_receivers();
                    break ticket;
                }
                Err(TrySendError::Full(returned)) => {
                    log::trace!("send_async: channel full, waiting for space");
                    value = returned;
                    notified.await;
                }
                Err(TrySendError::Closed(returned)) => return Err(SendError::Closed(returned)),
            }
        };

        loop {
            let notified = self.shared.space_notified();
            let result = self.shared.lock().handoff_result(ticket);

            if let Some(result) = result {
                return result;
            }
            log::trace!("send_async: waiting for a receiver to take handoff {ticket}");
            notified.await;
        }
    }

    /// Try to send a value without blocking.
    ///
    /// A rendezvous channel only accepts the value if a receiver is already waiting for one.
    /// Success means the value was placed in the slot, not that it was received: if that
    /// receiver stops waiting first (for example a cancelled [`Receiver::recv_async`]), the
    /// value stays in the slot for the next receive.
    ///
    /// [`Receiver::recv_async`]: crate::Receiver::recv_async
    /// # Errors
    ///
    /// * Returns `TrySendError::Full` if there is no room for the value right now
    /// * Returns `TrySendError::Closed` if the channel is closed or every receiver has been
    ///   dropped
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.shared.lock().try_push(value)?;
        self.shared.wake_receivers();
        Ok(())
    }

    /// Close the channel.
    ///
    /// Blocked and future sends fail. Receivers keep draining whatever is buffered and then
    /// observe the closure.
    ///
    /// # Errors
    ///
    /// * Returns `CloseError::AlreadyClosed` if the channel was already closed
    pub fn close(&self) -> Result<(), CloseError> {
        self.shared.lock().close()?;
        log::debug!("close: channel closed");
        self.shared.wake_all();
        Ok(())
    }

    /// `Some(0)` for a rendezvous channel, `None` for an unbounded one.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.shared.lock().capacity()
    }

    /// Number of items currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.lock().buffered()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().is_closed()
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.shared.lock().acquire_sender();
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        let closed = self.shared.lock().release_sender();
        if closed {
            log::debug!("drop: last sender dropped, closing channel");
            self.shared.wake_receivers();
        }
    }
}
