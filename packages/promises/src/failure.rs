use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A failure outcome carried by a promise/future pair.
///
/// Failures are shared handles: forwarding one down a continuation chain or
/// fanning it out through an aggregate never copies the underlying error.
/// The original error remains reachable through [`downcast_ref`][Self::downcast_ref].
///
/// `Failure` deliberately does not implement [`Error`] itself, which is what
/// allows any error type to convert into it via [`IntoFailure`].
///
/// # Examples
///
/// ```rust
/// use promises::{Failure, Promise};
///
/// let (mut promise, future) = Promise::<u32>::pair();
/// promise.set_failure(std::io::Error::other("disk on fire")).unwrap();
///
/// let failure: Failure = future.get().unwrap_err();
/// assert!(failure.is::<std::io::Error>());
/// ```
#[derive(Clone)]
pub struct Failure {
    inner: Arc<dyn Error + Send + Sync>,
}

impl Failure {
    /// Wraps an error value as a failure outcome.
    #[must_use]
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Returns a reference to the underlying error if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.inner.as_ref().downcast_ref::<E>()
    }

    /// Returns whether the underlying error is of type `E`.
    #[must_use]
    pub fn is<E>(&self) -> bool
    where
        E: Error + 'static,
    {
        self.downcast_ref::<E>().is_some()
    }

    /// Converts a caught panic payload into a failure outcome.
    ///
    /// Panic payloads are stringly typed; anything that is not a string
    /// becomes a fixed placeholder message.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&'static str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            String::from("non-string panic payload")
        };

        Self::new(PanicError { message })
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

/// Conversion accepted by [`Promise::set_failure`][crate::Promise::set_failure].
///
/// Implemented for every `Error + Send + Sync + 'static` type as well as for
/// [`Failure`] itself, so an already-wrapped failure can be forwarded verbatim
/// without growing another layer.
pub trait IntoFailure {
    /// Converts the value into a [`Failure`].
    fn into_failure(self) -> Failure;
}

impl IntoFailure for Failure {
    fn into_failure(self) -> Failure {
        self
    }
}

impl<E> IntoFailure for E
where
    E: Error + Send + Sync + 'static,
{
    fn into_failure(self) -> Failure {
        Failure::new(self)
    }
}

/// The failure produced when a continuation panics.
///
/// The panicking continuation's downstream future fails with this error
/// instead of poisoning anything or tearing down the thread that happened to
/// run the continuation.
#[derive(Debug)]
pub struct PanicError {
    message: String,
}

impl PanicError {
    /// The panic message, if the payload was a string.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Error for PanicError {}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "continuation panicked: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Failure: Send, Sync, Clone);

    #[derive(Debug)]
    struct FakeError(&'static str);

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake error: {}", self.0)
        }
    }

    impl Error for FakeError {}

    #[test]
    fn downcast_recovers_original_error() {
        let failure = Failure::new(FakeError("it broke"));

        let recovered = failure.downcast_ref::<FakeError>().unwrap();
        assert_eq!(recovered.0, "it broke");
    }

    #[test]
    fn downcast_to_wrong_type_is_none() {
        let failure = Failure::new(FakeError("it broke"));

        assert!(failure.downcast_ref::<PanicError>().is_none());
        assert!(!failure.is::<PanicError>());
    }

    #[test]
    fn display_passes_through_underlying_error() {
        let failure = Failure::new(FakeError("it broke"));

        assert_eq!(failure.to_string(), "fake error: it broke");
    }

    #[test]
    fn clones_share_the_same_error() {
        let failure = Failure::new(FakeError("shared"));
        let clone = failure.clone();

        let a: *const FakeError = failure.downcast_ref::<FakeError>().unwrap();
        let b: *const FakeError = clone.downcast_ref::<FakeError>().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn from_panic_keeps_str_message() {
        let failure = Failure::from_panic(Box::new("boom"));

        let panic = failure.downcast_ref::<PanicError>().unwrap();
        assert_eq!(panic.message(), "boom");
    }

    #[test]
    fn from_panic_keeps_string_message() {
        let failure = Failure::from_panic(Box::new(String::from("boom owned")));

        let panic = failure.downcast_ref::<PanicError>().unwrap();
        assert_eq!(panic.message(), "boom owned");
    }

    #[test]
    fn from_panic_tolerates_exotic_payload() {
        let failure = Failure::from_panic(Box::new(42_u8));

        let panic = failure.downcast_ref::<PanicError>().unwrap();
        assert_eq!(panic.message(), "non-string panic payload");
    }

    #[test]
    fn into_failure_wraps_errors_and_passes_failures_through() {
        let wrapped = FakeError("wrap me").into_failure();
        assert!(wrapped.is::<FakeError>());

        let passed = wrapped.clone().into_failure();
        let a: *const FakeError = wrapped.downcast_ref::<FakeError>().unwrap();
        let b: *const FakeError = passed.downcast_ref::<FakeError>().unwrap();
        assert_eq!(a, b);
    }
}
