use std::fmt;
use std::sync::Arc;

use crate::state::{Completion, SharedState};
use crate::{Failure, Future, IntoFailure, PromiseError};

/// The single-use write end of a promise/future pair.
///
/// A promise hands out its [`Future`] exactly once and is fulfilled at most
/// once, with either a value or a failure. Dropping a promise that was never
/// fulfilled delivers [`PromiseError::BrokenPromise`] to the consumer side,
/// so a consumer blocked in [`Future::get`] can never hang forever.
///
/// Promises are move-only; fulfillment may happen on any thread.
///
/// # Examples
///
/// ```rust
/// use promises::Promise;
///
/// let (mut promise, future) = Promise::pair();
/// promise.set_value(42).unwrap();
/// assert_eq!(future.get().unwrap(), 42);
/// ```
pub struct Promise<T>
where
    T: Send + 'static,
{
    shared: Arc<SharedState<T>>,
    future_retrieved: bool,
    fulfilled: bool,
}

impl<T> Promise<T>
where
    T: Send + 'static,
{
    /// Creates a new unfulfilled promise.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(SharedState::new()),
            future_retrieved: false,
            fulfilled: false,
        }
    }

    /// Creates a promise together with its future.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use promises::Promise;
    ///
    /// let (mut promise, future) = Promise::<String>::pair();
    /// promise.set_value("hello".to_string()).unwrap();
    /// assert_eq!(future.get().unwrap(), "hello");
    /// ```
    #[must_use]
    pub fn pair() -> (Self, Future<T>) {
        let mut promise = Self::new();
        let future = promise
            .future()
            .expect("a fresh promise has not handed out its future");
        (promise, future)
    }

    /// Returns the future bound to this promise.
    ///
    /// # Errors
    ///
    /// Returns [`PromiseError::FutureAlreadyRetrieved`] on the second call;
    /// a promise has exactly one consumer.
    pub fn future(&mut self) -> Result<Future<T>, PromiseError> {
        if self.future_retrieved {
            return Err(PromiseError::FutureAlreadyRetrieved);
        }
        self.future_retrieved = true;
        Ok(Future::new(Arc::clone(&self.shared)))
    }

    /// Fulfills the promise with a value.
    ///
    /// If a continuation or chained promise is installed on the shared state,
    /// it runs inline on the calling thread; if a consumer is blocked in
    /// [`Future::get`], it is woken.
    ///
    /// # Errors
    ///
    /// Returns [`PromiseError::PromiseAlreadySatisfied`] if this promise has
    /// already been fulfilled.
    pub fn set_value(&mut self, value: T) -> Result<(), PromiseError> {
        self.begin_fulfillment()?;
        self.shared.complete(Completion::Value(value));
        Ok(())
    }

    /// Fulfills the promise with a failure.
    ///
    /// Accepts any `Error + Send + Sync + 'static` value, or an existing
    /// [`Failure`] to forward verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`PromiseError::PromiseAlreadySatisfied`] if this promise has
    /// already been fulfilled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use promises::Promise;
    ///
    /// let (mut promise, future) = Promise::<u32>::pair();
    /// promise.set_failure(std::io::Error::other("no data")).unwrap();
    /// assert!(future.get().is_err());
    /// ```
    pub fn set_failure(&mut self, failure: impl IntoFailure) -> Result<(), PromiseError> {
        self.begin_fulfillment()?;
        self.shared
            .complete(Completion::Failure(failure.into_failure()));
        Ok(())
    }

    fn begin_fulfillment(&mut self) -> Result<(), PromiseError> {
        if self.fulfilled {
            return Err(PromiseError::PromiseAlreadySatisfied);
        }
        self.fulfilled = true;
        Ok(())
    }

    /// Consuming fulfillment for promises this crate created itself, which
    /// are fulfilled exactly once by construction.
    pub(crate) fn fulfill_value(mut self, value: T) {
        self.set_value(value)
            .expect("internal promise is fulfilled at most once");
    }

    /// Consuming failure counterpart of [`fulfill_value`][Self::fulfill_value].
    pub(crate) fn fulfill_failure(mut self, failure: Failure) {
        self.set_failure(failure)
            .expect("internal promise is fulfilled at most once");
    }
}

impl Promise<()> {
    /// Fulfills a unit promise, signaling completion without a value.
    ///
    /// # Errors
    ///
    /// Returns [`PromiseError::PromiseAlreadySatisfied`] if this promise has
    /// already been fulfilled.
    pub fn set_done(&mut self) -> Result<(), PromiseError> {
        self.set_value(())
    }
}

impl<T> Default for Promise<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Promise<T>
where
    T: Send + 'static,
{
    fn drop(&mut self) {
        if !self.fulfilled {
            self.fulfilled = true;
            self.shared
                .complete(Completion::Failure(Failure::new(PromiseError::BrokenPromise)));
        }
    }
}

impl<T> fmt::Debug for Promise<T>
where
    T: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("fulfilled", &self.fulfilled)
            .field("future_retrieved", &self.future_retrieved)
            .field("state", &self.shared.status())
            .finish()
    }
}
