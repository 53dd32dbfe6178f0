use std::sync::Arc;

use crate::{TryRecvError, shared::Shared};

/// Receiving half of a channel.
///
/// Receivers can be cloned; each item is delivered to exactly one of them. Once the channel
/// is closed, receivers drain the remaining buffered items before reporting the closure.
pub struct Receiver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> std::fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver").finish_non_exhaustive()
    }
}

impl<T> Receiver<T> {
    pub(crate) const fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Receive a value, blocking until one is available.
    ///
    /// Returns `None` once the channel is closed and every buffered item has been received.
    #[must_use]
    pub fn recv(&self) -> Option<T> {
        let mut state = self.shared.lock();

        loop {
            if let Some(item) = state.pop() {
                drop(state);
                self.shared.wake_senders();
                return Some(item);
            }
            if state.is_closed() {
                return None;
            }

            log::trace!("recv: channel empty, waiting for a message");
            state.park_receiver();
            state = self.shared.wait_for_message(state);
            state.unpark_receiver();
        }
    }

    /// Receive a value, suspending the task until one is available.
    ///
    /// Returns `None` once the channel is closed and every buffered item has been received.
    #[cfg(feature = "async")]
    pub async fn recv_async(&self) -> Option<T> {
        loop {
            let notified = self.shared.message_notified();

            let parked = {
                let mut state = self.shared.lock();
                if let Some(item) = state.pop() {
                    drop(state);
                    self.shared.wake_senders();
                    return Some(item);
                }
                if state.is_closed() {
                    return None;
                }
                state.park_receiver();
                ParkedReceiver {
                    shared: &self.shared,
                }
            };

            log::trace!("recv_async: channel empty, waiting for a message");
            notified.await;
            drop(parked);
        }
    }

    /// Try to receive a value without blocking.
    ///
    /// # Errors
    ///
    /// * Returns `TryRecvError::Empty` if no data is available
    /// * Returns `TryRecvError::Closed` if the channel is closed and drained
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut state = self.shared.lock();

        match state.pop() {
            Some(item) => {
                drop(state);
                self.shared.wake_senders();
                Ok(item)
            }
            None if state.is_closed() => Err(TryRecvError::Closed),
            None => Err(TryRecvError::Empty),
        }
    }

    /// Blocking iterator over received values, ending when the channel is closed and drained.
    #[must_use]
    pub const fn iter(&self) -> Iter<'_, T> {
        Iter { receiver: self }
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

    /// Whether the channel is closed. Buffered items may still be waiting to be received.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().is_closed()
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        self.shared.lock().acquire_receiver();
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        let last = self.shared.lock().release_receiver();
        if last {
            log::debug!("drop: last receiver dropped, failing pending sends");
            self.shared.wake_senders();
        }
    }
}

/// Counts an async receiver as waiting for as long as it is parked, including when its
/// future is dropped mid-wait.
#[cfg(feature = "async")]
struct ParkedReceiver<'a, T> {
    shared: &'a Shared<T>,
}

#[cfg(feature = "async")]
impl<T> Drop for ParkedReceiver<'_, T> {
    fn drop(&mut self) {
        self.shared.lock().unpark_receiver();
    }
}

/// Borrowing iterator returned by [`Receiver::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    receiver: &'a Receiver<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.recv()
    }
}

/// Owning iterator returned by [`Receiver::into_iter`].
#[derive(Debug)]
pub struct IntoIter<T> {
    receiver: Receiver<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.recv()
    }
}

impl<T> IntoIterator for Receiver<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { receiver: self }
    }
}

impl<'a, T> IntoIterator for &'a Receiver<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use pretty_assertions::assert_eq;

    use crate::{TryRecvError, bounded, unbounded};

    #[test_log::test]
    fn try_recv_empty() {
        let (_tx, rx) = unbounded::<i32>();

        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test_log::test]
    fn try_recv_closed_after_drain() {
        let (tx, rx) = bounded::<i32>(2);
        tx.send(1).unwrap();
        tx.close().unwrap();

        assert_eq!(rx.try_recv(), Ok(1));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
    }

    #[test_log::test]
    fn recv_drains_buffer_before_reporting_close() {
        let (tx, rx) = bounded::<&str>(3);
        tx.send("first").unwrap();
        tx.send("second").unwrap();
        tx.send("third").unwrap();
        tx.close().unwrap();

        assert!(rx.is_closed());
        assert_eq!(rx.recv(), Some("first"));
        assert_eq!(rx.recv(), Some("second"));
        assert_eq!(rx.recv(), Some("third"));
        assert_eq!(rx.recv(), None);
        assert_eq!(rx.recv(), None);
    }

    #[test_log::test]
    fn dropping_last_sender_closes() {
        let (tx, rx) = bounded::<i32>(1);
        let tx2 = tx.clone();
        tx.send(5).unwrap();

        drop(tx);
        assert!(!rx.is_closed());
        drop(tx2);

        assert!(rx.is_closed());
        assert_eq!(rx.recv(), Some(5));
        assert_eq!(rx.recv(), None);
    }

    #[test_log::test]
    fn blocked_recv_wakes_on_close() {
        let (tx, rx) = bounded::<i32>(1);

        let handle = thread::spawn(move || rx.recv());

        thread::sleep(Duration::from_millis(50));
        tx.close().unwrap();

        assert_eq!(handle.join().unwrap(), None);
    }

    #[test_log::test]
    fn iter_stops_when_closed_and_drained() {
        let (tx, rx) = unbounded::<u32>();

        let producer = thread::spawn(move || {
            for i in 0..10 {
                tx.send(i).unwrap();
            }
        });

        let received: Vec<_> = rx.iter().collect();
        producer.join().unwrap();

        assert_eq!(received, (0..10).collect::<Vec<_>>());
    }

    #[test_log::test]
    fn into_iter_consumes_receiver() {
        let (tx, rx) = bounded::<char>(4);
        for c in ['a', 'b', 'c'] {
            tx.send(c).unwrap();
        }
        tx.close().unwrap();

        let received: String = rx.into_iter().collect();

        assert_eq!(received, "abc");
    }

    #[test_log::test]
    fn each_item_goes_to_one_receiver() {
        let (tx, rx1) = unbounded::<i32>();
        let rx2 = rx1.clone();

        tx.send(1).unwrap();
        tx.send(2).unwrap();

        assert_eq!(rx1.recv(), Some(1));
        assert_eq!(rx2.recv(), Some(2));
        assert_eq!(rx1.try_recv(), Err(TryRecvError::Empty));
    }

    #[cfg(feature = "async")]
    #[test_log::test(tokio::test)]
    async fn recv_async_success() {
        let (tx, rx) = unbounded::<i32>();

        tx.send(42).unwrap();

        assert_eq!(rx.recv_async().await, Some(42));
    }

    #[cfg(feature = "async")]
    #[test_log::test(tokio::test)]
    async fn recv_async_closed() {
        let (tx, rx) = unbounded::<i32>();

        drop(tx);

        assert_eq!(rx.recv_async().await, None);
    }

    #[cfg(feature = "async")]
    #[test_log::test(tokio::test)]
    async fn recv_async_wakes_on_send_from_thread() {
        let (tx, rx) = bounded::<i32>(0);

        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.send(7)
        });

        assert_eq!(rx.recv_async().await, Some(7));
        assert_eq!(rx.recv_async().await, None);
        producer.join().unwrap().unwrap();
    }

    #[cfg(feature = "async")]
    #[test_log::test(tokio::test)]
    async fn cancelled_recv_async_unparks() {
        let (tx, rx) = bounded::<i32>(0);

        let timed_out = tokio::time::timeout(Duration::from_millis(20), rx.recv_async()).await;
        assert!(timed_out.is_err());

        assert!(matches!(tx.try_send(1), Err(crate::TrySendError::Full(1))));
    }

    #[cfg(feature = "async")]
    #[test_log::test(tokio::test)]
    async fn try_send_to_cancelled_recv_async_stays_in_slot() {
        use futures::FutureExt as _;

        let (tx, rx) = bounded::<i32>(0);

        let mut pending = Box::pin(rx.recv_async());
        assert!((&mut pending).now_or_never().is_none());

        tx.try_send(7).unwrap();
        drop(pending);

        assert_eq!(rx.try_recv(), Ok(7));
    }
}
