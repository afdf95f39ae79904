use std::error::Error;
use std::fmt;

use crate::Failure;

/// Misuse and sentinel errors of the promise/future protocol.
///
/// `BrokenPromise` is never returned directly: it is the failure outcome a
/// dropped-but-unfulfilled [`Promise`][crate::Promise] injects into its shared
/// state, observed by the consumer side through
/// [`Future::get`][crate::Future::get] or a failure observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseError {
    /// The promise was dropped before it was fulfilled.
    BrokenPromise,

    /// The future for this promise has already been retrieved.
    FutureAlreadyRetrieved,

    /// The promise has already been fulfilled with a value or failure.
    PromiseAlreadySatisfied,
}

impl Error for PromiseError {}

impl fmt::Display for PromiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::BrokenPromise => "promise was dropped before it was fulfilled",
            Self::FutureAlreadyRetrieved => "the future for this promise has already been retrieved",
            Self::PromiseAlreadySatisfied => "the promise has already been satisfied",
        };
        f.write_str(message)
    }
}

/// The failure produced by [`when_all`][crate::when_all] and its fixed-arity
/// variants when at least one input future fails.
///
/// Child failures keep the position of the input future they came from and are
/// ordered by that position, regardless of the order in which the inputs
/// actually completed.
#[derive(Debug, Clone)]
pub struct AggregateError {
    children: Vec<(usize, Failure)>,
}

impl AggregateError {
    pub(crate) fn new(children: Vec<(usize, Failure)>) -> Self {
        Self { children }
    }

    /// Iterates the child failures with the input positions they came from,
    /// in input order.
    pub fn children(&self) -> impl Iterator<Item = (usize, &Failure)> + '_ {
        self.children.iter().map(|(index, failure)| (*index, failure))
    }

    /// The number of failed inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether there are no child failures. Never true for an aggregate that
    /// actually surfaced, but [`len`][Self::len] wants a companion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Error for AggregateError {}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} aggregated input future(s) failed", self.children.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promise_error_display_writes_message() {
        for error in [
            PromiseError::BrokenPromise,
            PromiseError::FutureAlreadyRetrieved,
            PromiseError::PromiseAlreadySatisfied,
        ] {
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn aggregate_error_preserves_positions_and_order() {
        let aggregate = AggregateError::new(vec![
            (1, Failure::new(PromiseError::BrokenPromise)),
            (4, Failure::new(PromiseError::BrokenPromise)),
        ]);

        let positions: Vec<usize> = aggregate.children().map(|(index, _)| index).collect();
        assert_eq!(positions, vec![1, 4]);
        assert_eq!(aggregate.len(), 2);
        assert!(!aggregate.is_empty());
    }

    #[test]
    fn aggregate_error_display_counts_children() {
        let aggregate = AggregateError::new(vec![(0, Failure::new(PromiseError::BrokenPromise))]);

        assert_eq!(aggregate.to_string(), "1 aggregated input future(s) failed");
    }
}
