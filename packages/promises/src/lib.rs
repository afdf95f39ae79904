//! Single-shot promise/future pairs with inline continuations, blocking
//! retrieval and fan-in aggregation.
//!
//! A [`Promise<T>`] is the single-use write end of a completion: it is
//! fulfilled at most once, with a value or a [`Failure`]. Its [`Future<T>`]
//! is the single-use read end: it can block for the outcome ([`Future::get`]),
//! attach a transformation ([`Future::then`], [`Future::and_then`]) or attach
//! a failure observer ([`Future::on_failure`]). Handles are move-only; each
//! promise hands out exactly one future, and a promise dropped unfulfilled
//! delivers [`PromiseError::BrokenPromise`] so no consumer waits forever.
//!
//! There is no executor: continuations run inline on whichever thread
//! fulfills the promise, and `get` is the only blocking operation. Failures
//! propagate down continuation chains without invoking the intermediate
//! functions, and a continuation returning another future is flattened, so a
//! chain is always observed as a single level.
//!
//! [`when_all`] and its fixed-arity variants ([`when_all2`] through
//! [`when_all5`]) aggregate several futures into one, preserving input
//! positions and collecting child failures into an [`AggregateError`].
//!
//! # Example: hand a value between threads
//!
//! ```rust
//! use std::thread;
//!
//! use promises::Promise;
//!
//! let (mut promise, future) = Promise::pair();
//!
//! let producer = thread::spawn(move || {
//!     promise.set_value(42).unwrap();
//! });
//!
//! assert_eq!(future.get().unwrap(), 42);
//! producer.join().unwrap();
//! ```
//!
//! # Example: continuation chains
//!
//! ```rust
//! use promises::Promise;
//!
//! let (mut promise, future) = Promise::pair();
//! let chained = future.then(|x: u32| x + 1).then(|x| x * 10);
//!
//! promise.set_value(4).unwrap();
//! assert_eq!(chained.get().unwrap(), 50);
//! ```
//!
//! # Example: aggregation
//!
//! ```rust
//! use promises::{when_all, Promise};
//!
//! let (mut first, a) = Promise::pair();
//! let (mut second, b) = Promise::pair();
//! let all = when_all([a, b]);
//!
//! second.set_value(2).unwrap();
//! first.set_value(1).unwrap();
//!
//! assert_eq!(all.get().unwrap(), vec![1, 2]);
//! ```

mod continuation;
mod errors;
mod failure;
mod future;
mod promise;
mod state;
#[cfg(test)]
mod test_utils;
mod when_all;

pub use errors::{AggregateError, PromiseError};
pub use failure::{Failure, IntoFailure, PanicError};
pub use future::Future;
pub use promise::Promise;
pub use when_all::{when_all, when_all2, when_all3, when_all4, when_all5};
