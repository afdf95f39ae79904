//! Example demonstrating cross-thread hand-off and continuation chaining.

use std::thread;
use std::time::Duration;

use promises::{Promise, PromiseError};

fn main() {
    println!("=== Promise chaining example ===");

    // Example 1: hand a value from a worker thread to a blocked retriever.
    println!("\n1. Cross-thread round trip:");
    let (mut promise, future) = Promise::pair();
    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        promise.set_value("made on a worker thread".to_string()).unwrap();
    });
    println!("Received: {}", future.get().unwrap());
    producer.join().unwrap();

    // Example 2: continuations run inline on the fulfilling thread.
    println!("\n2. Continuation chain:");
    let (mut promise, future) = Promise::pair();
    let chained = future.then(|x: u32| x + 1).then(|x| x * 10);
    promise.set_value(4).unwrap();
    println!("(4 + 1) * 10 = {}", chained.get().unwrap());

    // Example 3: a continuation returning a future is flattened.
    println!("\n3. Flattened continuation:");
    let (mut outer, outer_future) = Promise::pair();
    let (mut inner, inner_future) = Promise::pair();
    let flattened = outer_future.and_then(move |_: u32| inner_future);
    outer.set_value(7).unwrap();
    inner.set_value(99).unwrap();
    println!("Inner value observed directly: {}", flattened.get().unwrap());

    // Example 4: a dropped promise is never silent.
    println!("\n4. Broken promise:");
    let (promise, future) = Promise::<u32>::pair();
    drop(promise);
    let failure = future.get().unwrap_err();
    assert_eq!(
        failure.downcast_ref::<PromiseError>(),
        Some(&PromiseError::BrokenPromise)
    );
    println!("Observed failure: {failure}");
}
