//! Bounded blocking channel with a one-shot close signal.
//!
//! A channel is a FIFO queue shared by any number of [`Sender`]s and [`Receiver`]s:
//!
//! * [`bounded`] with a positive capacity buffers up to that many items; sends block while
//!   the buffer is full.
//! * [`bounded`] with capacity `0` is a rendezvous channel: a send completes only once a
//!   receiver has taken the item.
//! * [`unbounded`] never blocks a sender.
//!
//! [`Sender::close`] ends the stream. Sends fail from then on, while receivers still drain
//! every buffered item before [`Receiver::recv`] returns `None`.
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//!
//! let (tx, rx) = handoff_channel::bounded::<u32>(2);
//!
//! let producer = thread::spawn(move || {
//!     for i in 0..5 {
//!         tx.send(i).unwrap();
//!     }
//!     tx.close().unwrap();
//! });
//!
//! let received: Vec<_> = rx.iter().collect();
//! producer.join().unwrap();
//!
//! assert_eq!(received, vec![0, 1, 2, 3, 4]);
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

mod error;
mod receiver;
mod sender;
mod shared;

pub use error::{CloseError, SendError, TryRecvError, TrySendError};
pub use receiver::{IntoIter, Iter, Receiver};
pub use sender::Sender;

use shared::Shared;

/// Create a channel holding at most `capacity` buffered items.
///
/// A `capacity` of `0` creates a rendezvous channel.
#[must_use]
pub fn bounded<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    channel(Some(capacity))
}

/// Create a channel whose buffer grows without limit.
#[must_use]
pub fn unbounded<T>() -> (Sender<T>, Receiver<T>) {
    channel(None)
}

fn channel<T>(capacity: Option<usize>) -> (Sender<T>, Receiver<T>) {
    let shared = Arc::new(Shared::new(capacity));
    (Sender::new(shared.clone()), Receiver::new(shared))
}
