//! Completion barrier.
//!
//! A [`CompletionBarrier`] is created with the number of tasks it waits for. Each task calls
//! [`CompletionBarrier::signal`] exactly once when it is done, and any number of waiters block
//! in [`CompletionBarrier::wait`] until every task has signaled.
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//!
//! use handoff_barrier::CompletionBarrier;
//!
//! let barrier = CompletionBarrier::new(3);
//!
//! for i in 0..3 {
//!     let barrier = barrier.clone();
//!     thread::spawn(move || {
//!         println!("worker {i} done");
//!         barrier.signal().unwrap();
//!     });
//! }
//!
//! barrier.wait();
//! assert!(barrier.is_satisfied());
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod barrier;

pub use barrier::{CompletionBarrier, SignalError};
