use std::fmt;
use std::sync::Arc;

use crate::continuation::{ChainContinuation, MapContinuation};
use crate::state::{Completion, Reaction, SharedState};
use crate::{Failure, Promise};

/// The single-use read end of a promise/future pair.
///
/// A future is consumed by its first use: [`get`][Self::get] blocks for and
/// returns the outcome, while [`then`][Self::then], [`and_then`][Self::and_then]
/// and [`on_failure`][Self::on_failure] attach a reaction that the fulfilling
/// thread runs inline. Futures are move-only and may be sent across threads.
///
/// Failures travel down continuation chains on their own: every link forwards
/// an upstream failure to its downstream future without invoking the user
/// function, so only the final consumer needs to look at the error.
///
/// # Examples
///
/// ```rust
/// use promises::Promise;
///
/// let (mut promise, future) = Promise::pair();
/// let chained = future.then(|x: u32| x + 1).then(|x| x * 10);
///
/// promise.set_value(4).unwrap();
/// assert_eq!(chained.get().unwrap(), 50);
/// ```
pub struct Future<T>
where
    T: Send + 'static,
{
    shared: Arc<SharedState<T>>,
}

impl<T> Future<T>
where
    T: Send + 'static,
{
    pub(crate) fn new(shared: Arc<SharedState<T>>) -> Self {
        Self { shared }
    }

    /// Creates a future that is already fulfilled with `value`.
    ///
    /// Useful as the short-circuit arm of an [`and_then`][Self::and_then]
    /// continuation that does not always need to start more work.
    #[must_use]
    pub fn ready(value: T) -> Self {
        let shared = Arc::new(SharedState::new());
        shared.complete(Completion::Value(value));
        Self { shared }
    }

    /// Blocks until the promise side settles, then returns the outcome.
    ///
    /// This is the only blocking operation in the crate. If the promise was
    /// dropped unfulfilled the failure is
    /// [`PromiseError::BrokenPromise`][crate::PromiseError::BrokenPromise],
    /// so `get` never blocks forever on an abandoned producer.
    ///
    /// # Errors
    ///
    /// Returns the stored failure if the promise was fulfilled with one.
    pub fn get(self) -> Result<T, Failure> {
        match self.shared.wait_settled() {
            Completion::Value(value) => Ok(value),
            Completion::Failure(failure) => Err(failure),
        }
    }

    /// Attaches a transforming continuation and returns the future of its
    /// result.
    ///
    /// If this future already settled with a value, `func` runs immediately on
    /// the calling thread; otherwise it runs on whichever thread fulfills the
    /// promise. If this future settled (or later settles) with a failure, the
    /// failure is forwarded to the returned future and `func` is never
    /// invoked. A panic in `func` fails the returned future with
    /// [`PanicError`][crate::PanicError].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use promises::Promise;
    ///
    /// let (mut promise, future) = Promise::pair();
    /// let doubled = future.then(|x: u32| x * 2);
    ///
    /// promise.set_value(21).unwrap();
    /// assert_eq!(doubled.get().unwrap(), 42);
    /// ```
    #[must_use]
    pub fn then<R, F>(self, func: F) -> Future<R>
    where
        R: Send + 'static,
        F: FnOnce(T) -> R + Send + 'static,
    {
        let (downstream, result) = Promise::pair();
        self.shared
            .attach(Reaction::Continue(Box::new(MapContinuation::new(
                func, downstream,
            ))));
        result
    }

    /// Attaches a continuation that itself returns a future, collapsing the
    /// nesting.
    ///
    /// The future returned by `func` is chained into the returned future, so
    /// the result is a `Future<R>`, never a future of a future, and it
    /// settles when the inner future settles.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use promises::Promise;
    ///
    /// let (mut first, first_future) = Promise::pair();
    /// let (mut second, second_future) = Promise::pair();
    ///
    /// let flattened = first_future.and_then(move |_: u32| second_future);
    ///
    /// first.set_value(7).unwrap();
    /// second.set_value(99).unwrap();
    /// assert_eq!(flattened.get().unwrap(), 99);
    /// ```
    #[must_use]
    pub fn and_then<R, F>(self, func: F) -> Future<R>
    where
        R: Send + 'static,
        F: FnOnce(T) -> Future<R> + Send + 'static,
    {
        let (downstream, result) = Promise::pair();
        self.shared
            .attach(Reaction::Continue(Box::new(ChainContinuation::new(
                func, downstream,
            ))));
        result
    }

    /// Attaches a failure observer.
    ///
    /// `func` is invoked with the failure if this future settled (or later
    /// settles) with one; a value retires the observer without invoking it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use promises::{Promise, PromiseError};
    ///
    /// let (promise, future) = Promise::<u32>::pair();
    /// future.on_failure(|failure| {
    ///     assert!(failure.is::<PromiseError>());
    /// });
    /// drop(promise); // breaks the promise, invoking the observer
    /// ```
    pub fn on_failure<F>(self, func: F)
    where
        F: FnOnce(Failure) + Send + 'static,
    {
        self.shared.attach(Reaction::ObserveFailure(Box::new(func)));
    }

    /// Chains this future into `downstream`: an already-arrived outcome is
    /// forwarded immediately, otherwise `downstream` is installed in the
    /// chained-promise slot and fulfilled whenever this future settles.
    pub(crate) fn chain_into(self, downstream: Promise<T>) {
        self.shared.attach(Reaction::Forward(downstream));
    }
}

impl<T> fmt::Debug for Future<T>
where
    T: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("state", &self.shared.status())
            .finish()
    }
}
