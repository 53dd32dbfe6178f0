#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Producer/consumer example for `handoff_channel`.
//!
//! A producer sends a handful of numbers and closes the channel while a consumer drains it.
//! The run is repeated with a buffered channel and with a rendezvous channel, printing how
//! long each send and receive was blocked so the difference between the two is visible.
//! Both threads are joined through a `CompletionBarrier`.

use std::{
    thread,
    time::{Duration, Instant},
};

use handoff_barrier::CompletionBarrier;
use handoff_channel::{Receiver, SendError, Sender, bounded};

/// Delays applied by each side of a run.
#[derive(Debug, Clone, Copy)]
struct Pace {
    /// How long the producer waits before its first send.
    producer_start: Duration,
    /// How long the producer waits after each send.
    producer_step: Duration,
    /// How long the consumer waits after each receive.
    consumer_step: Duration,
}

fn produce(tx: &Sender<usize>, count: usize, pace: Pace) -> Result<(), SendError<usize>> {
    thread::sleep(pace.producer_start);

    for i in 0..count {
        let start = Instant::now();
        tx.send(i)?;
        println!("send {i} blocked for {:?}", start.elapsed());
        thread::sleep(pace.producer_step);
    }

    if let Err(e) = tx.close() {
        log::warn!("producer: {e}");
    }
    Ok(())
}

fn consume(rx: &Receiver<usize>, pace: Pace) -> usize {
    let mut received = 0;

    loop {
        let start = Instant::now();
        let Some(value) = rx.recv() else {
            break;
        };
        println!("receive {value} blocked for {:?}", start.elapsed());
        received += 1;
        thread::sleep(pace.consumer_step);
    }

    received
}

fn run(capacity: usize, count: usize, pace: Pace) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = bounded::<usize>(capacity);
    let done = CompletionBarrier::new(2);

    let producer = thread::spawn({
        let done = done.clone();
        move || {
            let result = produce(&tx, count, pace);
            if let Err(e) = done.signal() {
                log::error!("producer: {e}");
            }
            result
        }
    });

    let consumer = thread::spawn({
        let done = done.clone();
        move || {
            let received = consume(&rx, pace);
            if let Err(e) = done.signal() {
                log::error!("consumer: {e}");
            }
            received
        }
    });

    done.wait();

    producer
        .join()
        .map_err(|_| "producer thread panicked")??;
    let received = consumer.join().map_err(|_| "consumer thread panicked")?;
    println!("consumer received {received} of {count} values");

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    println!("=== Buffered channel (capacity 2) ===");
    println!("The producer fills the buffer without blocking, then waits on the slow consumer.\n");
    run(
        2,
        5,
        Pace {
            producer_start: Duration::from_millis(400),
            producer_step: Duration::ZERO,
            consumer_step: Duration::from_millis(400),
        },
    )?;

    println!("\n=== Rendezvous channel (capacity 0) ===");
    println!("Every send waits until the consumer takes the value.\n");
    run(
        0,
        3,
        Pace {
            producer_start: Duration::ZERO,
            producer_step: Duration::from_millis(200),
            consumer_step: Duration::ZERO,
        },
    )?;

    Ok(())
}
