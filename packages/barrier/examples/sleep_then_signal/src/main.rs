#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Completion barrier example for `handoff_barrier`.
//!
//! Three workers each sleep for a different amount of time, report that they are done and
//! signal the barrier. The main thread waits on the barrier and only continues once all of
//! them have finished. The same scenario then runs again with async tasks and
//! `CompletionBarrier::wait_async`.

use std::{thread, time::Duration};

use handoff_barrier::CompletionBarrier;

const WORKER_DELAYS_MS: [u64; 3] = [10, 11, 12];

fn run_threads() {
    let barrier = CompletionBarrier::new(WORKER_DELAYS_MS.len());

    for ttl in WORKER_DELAYS_MS {
        let barrier = barrier.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(ttl));
            println!("thread worker finished, ttl {ttl}ms");
            if let Err(e) = barrier.signal() {
                log::error!("thread worker {ttl}: {e}");
            }
        });
    }

    barrier.wait();
    println!("all {} thread workers finished", barrier.count());
}

async fn run_tasks() {
    let barrier = CompletionBarrier::new(WORKER_DELAYS_MS.len());

    for ttl in WORKER_DELAYS_MS {
        let barrier = barrier.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ttl)).await;
            println!("task worker finished, ttl {ttl}ms");
            if let Err(e) = barrier.signal() {
                log::error!("task worker {ttl}: {e}");
            }
        });
    }

    barrier.wait_async().await;
    println!("all {} task workers finished", barrier.count());
}

fn main() -> Result<(), std::io::Error> {
    pretty_env_logger::init();

    println!("=== Threads ===");
    run_threads();

    println!("\n=== Async tasks ===");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(run_tasks());

    Ok(())
}
