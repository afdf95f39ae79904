//! Example demonstrating fan-in aggregation over several futures.

use std::thread;

use promises::{when_all, when_all2, AggregateError, Promise};

fn main() {
    println!("=== when_all example ===");

    // Example 1: gather values from several worker threads, in input order.
    println!("\n1. Homogeneous gather:");
    let mut futures = Vec::new();
    let mut workers = Vec::new();
    for index in 0..4_u32 {
        let (mut promise, future) = Promise::pair();
        futures.push(future);
        workers.push(thread::spawn(move || {
            promise.set_value(index * index).unwrap();
        }));
    }
    let squares = when_all(futures).get().unwrap();
    println!("Squares in input order: {squares:?}");
    for worker in workers {
        worker.join().unwrap();
    }

    // Example 2: heterogeneous aggregation into a tuple.
    println!("\n2. Heterogeneous gather:");
    let (mut count_promise, count_future) = Promise::pair();
    let (mut label_promise, label_future) = Promise::pair();
    let both = when_all2(count_future, label_future);
    label_promise.set_value("items".to_string()).unwrap();
    count_promise.set_value(3_u32).unwrap();
    let (count, label) = both.get().unwrap();
    println!("Got {count} {label}");

    // Example 3: failures are aggregated with their input positions.
    println!("\n3. Aggregated failure:");
    let (mut ok_promise, ok_future) = Promise::pair();
    let (mut bad_promise, bad_future) = Promise::pair();
    let all = when_all(vec![ok_future, bad_future]);
    ok_promise.set_value(1).unwrap();
    bad_promise
        .set_failure(std::io::Error::other("slot two failed"))
        .unwrap();

    let failure = all.get().unwrap_err();
    let aggregate = failure.downcast_ref::<AggregateError>().unwrap();
    for (position, child) in aggregate.children() {
        println!("Input {position} failed with: {child}");
    }
}
