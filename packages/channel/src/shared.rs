//! State shared by every handle of one channel.
//!
//! All mutation happens under a single mutex. Blocking callers park on a condvar and async
//! callers on a [`tokio::sync::Notify`]; every state change wakes both kinds of waiters.

use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
};

use crate::{CloseError, SendError, TrySendError};

/// Where an accepted item ended up.
pub enum Push {
    /// The item is buffered and the send is complete.
    Buffered,
    /// The item occupies the rendezvous slot. The send completes once a receiver takes the
    /// item with this ticket.
    Handoff(u64),
}

pub struct State<T> {
    capacity: Option<usize>,
    buffer: VecDeque<T>,
    closed: bool,
    pushed: u64,
    popped: u64,
    senders: usize,
    receivers: usize,
    waiting_receivers: usize,
}

impl<T> State<T> {
    fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            buffer: VecDeque::new(),
            closed: false,
            pushed: 0,
            popped: 0,
            senders: 1,
            receivers: 1,
            waiting_receivers: 0,
        }
    }

    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Sends can never be delivered once closed or once nobody is left to receive.
    const fn is_disconnected(&self) -> bool {
        self.closed || self.receivers == 0
    }

    /// Enqueues `item` if there is room for it.
    ///
    /// A rendezvous channel accepts an item whenever its slot is free; the sender then waits
    /// for the handoff with [`State::handoff_result`].
    pub fn push(&mut self, item: T) -> Result<Push, TrySendError<T>> {
        if self.is_disconnected() {
            return Err(TrySendError::Closed(item));
        }

        match self.capacity {
            Some(0) if !self.buffer.is_empty() => Err(TrySendError::Full(item)),
            Some(0) => {
                let ticket = self.pushed;
                self.enqueue(item);
                Ok(Push::Handoff(ticket))
            }
            Some(capacity) if self.buffer.len() >= capacity => Err(TrySendError::Full(item)),
            _ => {
                self.enqueue(item);
                Ok(Push::Buffered)
            }
        }
    }

    /// Like [`State::push`], but a rendezvous item is only accepted when a receiver is
    /// already parked and will take it.
    pub fn try_push(&mut self, item: T) -> Result<(), TrySendError<T>> {
        if self.capacity == Some(0) && self.waiting_receivers == 0 && !self.is_disconnected() {
            return Err(TrySendError::Full(item));
        }

        self.push(item).map(|_| ())
    }

    fn enqueue(&mut self, item: T) {
        self.buffer.push_back(item);
        self.pushed += 1;
    }

    /// Resolves a pending rendezvous handoff.
    ///
    /// Returns `None` while the item is still waiting in the slot. If the channel became
    /// disconnected first, the item is taken back out of the slot and returned in the error.
    pub fn handoff_result(&mut self, ticket: u64) -> Option<Result<(), SendError<T>>> {
        if self.popped > ticket {
            return Some(Ok(()));
        }
        if !self.is_disconnected() {
            return None;
        }

        // The slot holds at most one item, and it is this sender's.
        match self.buffer.pop_back() {
            Some(item) => {
                self.pushed -= 1;
                Some(Err(SendError::Closed(item)))
            }
            None => Some(Ok(())),
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        let item = self.buffer.pop_front()?;
        self.popped += 1;
        Some(item)
    }

    pub fn close(&mut self) -> Result<(), CloseError> {
        if self.closed {
            return Err(CloseError::AlreadyClosed);
        }
        self.closed = true;
        Ok(())
    }

    pub const fn park_receiver(&mut self) {
        self.waiting_receivers += 1;
    }

    pub const fn unpark_receiver(&mut self) {
        self.waiting_receivers -= 1;
    }

    pub const fn acquire_sender(&mut self) {
        self.senders += 1;
    }

    /// Returns `true` when the last sender left and that implicitly closed the channel.
    pub const fn release_sender(&mut self) -> bool {
        self.senders -= 1;
        if self.senders == 0 && !self.closed {
            self.closed = true;
            return true;
        }
        false
    }

    pub const fn acquire_receiver(&mut self) {
        self.receivers += 1;
    }

    /// Returns `true` when the last receiver left.
    pub const fn release_receiver(&mut self) -> bool {
        self.receivers -= 1;
        self.receivers == 0
    }
}

pub struct Shared<T> {
    state: Mutex<State<T>>,
    /// Senders park here, waiting for room in the buffer or for their handoff to be taken.
    space_available: Condvar,
    message_available: Condvar,
    #[cfg(feature = "async")]
    space_notify: tokio::sync::Notify,
    #[cfg(feature = "async")]
    message_notify: tokio::sync::Notify,
}

impl<T> Shared<T> {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(State::new(capacity)),
            space_available: Condvar::new(),
            message_available: Condvar::new(),
            #[cfg(feature = "async")]
            space_notify: tokio::sync::Notify::new(),
            #[cfg(feature = "async")]
            message_notify: tokio::sync::Notify::new(),
        }
    }

    /// The state is consistent at the end of every critical section, so a panic in another
    /// holder does not invalidate it.
    pub fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn wait_for_space<'a>(&self, guard: MutexGuard<'a, State<T>>) -> MutexGuard<'a, State<T>> {
        self.space_available
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn wait_for_message<'a>(
        &self,
        guard: MutexGuard<'a, State<T>>,
    ) -> MutexGuard<'a, State<T>> {
        self.message_available
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Must be created before the state is checked, otherwise a wake-up in between is lost.
    #[cfg(feature = "async")]
    pub fn space_notified(&self) -> tokio::sync::futures::Notified<'_> {
        self.space_notify.notified()
    }

    /// Must be created before the state is checked, otherwise a wake-up in between is lost.
    #[cfg(feature = "async")]
    pub fn message_notified(&self) -> tokio::sync::futures::Notified<'_> {
        self.message_notify.notified()
    }

    pub fn wake_senders(&self) {
        self.space_available.notify_all();
        #[cfg(feature = "async")]
        self.space_notify.notify_waiters();
    }

    pub fn wake_receivers(&self) {
        self.message_available.notify_all();
        #[cfg(feature = "async")]
        self.message_notify.notify_waiters();
    }

    pub fn wake_all(&self) {
        self.wake_senders();
        self.wake_receivers();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test]
    fn bounded_push_fills_then_reports_full() {
        let mut state = State::new(Some(2));

        assert!(matches!(state.push(1), Ok(Push::Buffered)));
        assert!(matches!(state.push(2), Ok(Push::Buffered)));
        assert!(matches!(state.push(3), Err(TrySendError::Full(3))));
        assert_eq!(state.buffered(), 2);
    }

    #[test_log::test]
    fn huge_capacity_does_not_preallocate() {
        let (tx, rx) = crate::bounded::<u64>(usize::MAX);

        tx.send(1).unwrap();

        assert_eq!(tx.capacity(), Some(usize::MAX));
        assert_eq!(rx.recv(), Some(1));
    }

    #[test_log::test]
    fn unbounded_push_never_reports_full() {
        let mut state = State::new(None);

        for i in 0..1_000 {
            assert!(matches!(state.push(i), Ok(Push::Buffered)));
        }
        assert_eq!(state.buffered(), 1_000);
    }

    #[test_log::test]
    fn rendezvous_push_hands_out_increasing_tickets() {
        let mut state = State::new(Some(0));

        let Ok(Push::Handoff(first)) = state.push('a') else {
            panic!("expected a handoff");
        };
        assert!(matches!(state.push('b'), Err(TrySendError::Full('b'))));
        assert!(state.handoff_result(first).is_none());

        assert_eq!(state.pop(), Some('a'));
        assert!(matches!(state.handoff_result(first), Some(Ok(()))));

        let Ok(Push::Handoff(second)) = state.push('c') else {
            panic!("expected a handoff");
        };
        assert!(second > first);
    }

    #[test_log::test]
    fn rendezvous_handoff_reclaims_item_on_close() {
        let mut state = State::new(Some(0));

        let Ok(Push::Handoff(ticket)) = state.push(5) else {
            panic!("expected a handoff");
        };
        state.close().unwrap();

        assert!(matches!(
            state.handoff_result(ticket),
            Some(Err(SendError::Closed(5)))
        ));
        assert_eq!(state.buffered(), 0);
        assert_eq!(state.pop(), None);
    }

    #[test_log::test]
    fn rendezvous_try_push_requires_parked_receiver() {
        let mut state = State::new(Some(0));

        assert!(matches!(state.try_push(1), Err(TrySendError::Full(1))));

        state.park_receiver();
        assert!(state.try_push(1).is_ok());
        state.unpark_receiver();
        assert_eq!(state.pop(), Some(1));
    }

    #[test_log::test]
    fn push_after_close_is_rejected() {
        let mut state = State::new(Some(4));
        state.close().unwrap();

        assert!(matches!(state.push(1), Err(TrySendError::Closed(1))));
        assert!(matches!(state.try_push(2), Err(TrySendError::Closed(2))));
    }

    #[test_log::test]
    fn close_twice_fails() {
        let mut state = State::<()>::new(Some(1));

        assert_eq!(state.close(), Ok(()));
        assert_eq!(state.close(), Err(CloseError::AlreadyClosed));
    }

    #[test_log::test]
    fn last_sender_release_closes_once() {
        let mut state = State::<()>::new(Some(1));
        state.acquire_sender();

        assert!(!state.release_sender());
        assert!(state.release_sender());
        assert!(state.is_closed());
    }

    #[test_log::test]
    fn last_receiver_release_disconnects_senders() {
        let mut state = State::new(Some(1));
        state.acquire_receiver();

        assert!(!state.release_receiver());
        assert!(state.release_receiver());
        assert!(!state.is_closed());
        assert!(matches!(state.push(9), Err(TrySendError::Closed(9))));
    }
}
