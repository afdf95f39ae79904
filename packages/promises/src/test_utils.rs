//! Testing utilities shared across the test modules.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

const DEADLINE: Duration = Duration::from_secs(10);

/// Runs a test body on a worker thread and fails the test if the body does
/// not finish within the deadline, naming the operation that got stuck.
///
/// A regression in waiter notification would otherwise hang the whole suite
/// inside `get()`; this turns the hang into a prompt failure that says which
/// scenario stalled. A panic inside the body is re-raised on the test thread
/// so ordinary assertion failures report as usual.
pub(crate) fn with_deadline<F, R>(operation: &'static str, test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    struct Checkpoint<R> {
        result: Mutex<Option<thread::Result<R>>>,
        finished: Condvar,
    }

    let checkpoint = Arc::new(Checkpoint {
        result: Mutex::new(None),
        finished: Condvar::new(),
    });

    let worker_checkpoint = Arc::clone(&checkpoint);
    let worker = thread::Builder::new()
        .name(format!("deadline-{operation}"))
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(test_fn));
            *worker_checkpoint.result.lock() = Some(outcome);
            worker_checkpoint.finished.notify_one();
        })
        .expect("spawning the deadline worker thread");

    let give_up_at = Instant::now() + DEADLINE;
    let mut result = checkpoint.result.lock();
    while result.is_none() {
        let timed_out = checkpoint.finished.wait_until(&mut result, give_up_at).timed_out();
        if timed_out && result.is_none() {
            // The worker is abandoned; it is stuck in the operation under test.
            panic!("{operation} did not complete within {DEADLINE:?}");
        }
    }
    let outcome = result.take().expect("the loop above established a result");
    drop(result);

    worker
        .join()
        .expect("the worker published a result, so it is past the test body");

    match outcome {
        Ok(value) => value,
        Err(cause) => panic::resume_unwind(cause),
    }
}
