//! Continuation records stored in a shared state's reaction slot.
//!
//! A continuation is polymorphic over its return type, so the state stores it
//! behind a two-method trait object: one arm receives the upstream value, the
//! other the upstream failure. Each holder owns the user function and the
//! downstream promise, and invoking either arm consumes the holder.

use std::panic::{self, AssertUnwindSafe};

use crate::future::Future;
use crate::promise::Promise;
use crate::Failure;

/// The two-armed continuation record.
pub(crate) trait Continuation<T>: Send {
    /// The upstream settled with a value.
    fn on_value(self: Box<Self>, value: T);

    /// The upstream settled with a failure; it is forwarded downstream
    /// without invoking the user function.
    fn on_failure(self: Box<Self>, failure: Failure);
}

/// Runs a user continuation, converting a panic into a failure outcome.
pub(crate) fn catch_failure<R>(func: impl FnOnce() -> R) -> Result<R, Failure> {
    panic::catch_unwind(AssertUnwindSafe(func)).map_err(Failure::from_panic)
}

/// Holder for `then`: the function's return value fulfills the downstream
/// promise directly.
pub(crate) struct MapContinuation<F, R>
where
    R: Send + 'static,
{
    func: F,
    downstream: Promise<R>,
}

impl<F, R> MapContinuation<F, R>
where
    R: Send + 'static,
{
    pub(crate) fn new(func: F, downstream: Promise<R>) -> Self {
        Self { func, downstream }
    }
}

impl<T, F, R> Continuation<T> for MapContinuation<F, R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: FnOnce(T) -> R + Send + 'static,
{
    fn on_value(self: Box<Self>, value: T) {
        let Self { func, downstream } = *self;
        match catch_failure(move || func(value)) {
            Ok(result) => downstream.fulfill_value(result),
            Err(failure) => downstream.fulfill_failure(failure),
        }
    }

    fn on_failure(self: Box<Self>, failure: Failure) {
        let Self { downstream, .. } = *self;
        downstream.fulfill_failure(failure);
    }
}

/// Holder for `and_then`: the function returns another future, which is
/// chained into the downstream promise so the caller never observes nesting.
pub(crate) struct ChainContinuation<F, R>
where
    R: Send + 'static,
{
    func: F,
    downstream: Promise<R>,
}

impl<F, R> ChainContinuation<F, R>
where
    R: Send + 'static,
{
    pub(crate) fn new(func: F, downstream: Promise<R>) -> Self {
        Self { func, downstream }
    }
}

impl<T, F, R> Continuation<T> for ChainContinuation<F, R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: FnOnce(T) -> Future<R> + Send + 'static,
{
    fn on_value(self: Box<Self>, value: T) {
        let Self { func, downstream } = *self;
        match catch_failure(move || func(value)) {
            Ok(inner) => inner.chain_into(downstream),
            Err(failure) => downstream.fulfill_failure(failure),
        }
    }

    fn on_failure(self: Box<Self>, failure: Failure) {
        let Self { downstream, .. } = *self;
        downstream.fulfill_failure(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PanicError;

    #[test]
    fn catch_failure_passes_values_through() {
        let result = catch_failure(|| 7);
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn catch_failure_converts_panics() {
        let result: Result<(), Failure> = catch_failure(|| panic!("deliberate"));

        let failure = result.unwrap_err();
        let panic = failure.downcast_ref::<PanicError>().unwrap();
        assert_eq!(panic.message(), "deliberate");
    }
}
