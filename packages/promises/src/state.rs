//! The shared completion state between one promise and one future.
//!
//! Every completion event commits exactly one disposal:
//!
//! * store the outcome and wake any blocked retriever, or
//! * invoke the installed continuation, or
//! * forward to the chained downstream promise, or
//! * hand the failure to the installed failure observer.
//!
//! The reaction slot holds at most one of the latter three, and once any
//! reaction has been installed the outcome slot stays empty forever: every
//! completion from that point on travels through the slot instead of being
//! stored. User code (continuations, observers, and their destructors) never
//! runs while the state mutex is held.
//!
//! The state itself is not reference counted by hand; both endpoints hold an
//! `Arc` strong reference (at most two) and the last endpoint to be dropped or
//! consumed releases the state.

use std::mem;

use parking_lot::{Condvar, Mutex};

use crate::continuation::Continuation;
use crate::{Failure, Promise};

/// The failure-observer form of a reaction.
pub(crate) type FailureObserver = Box<dyn FnOnce(Failure) + Send>;

/// The result slot of a shared state.
pub(crate) enum Outcome<T> {
    Empty,
    Value(T),
    Failure(Failure),
}

/// A completion event in flight: what a promise was fulfilled with.
pub(crate) enum Completion<T> {
    Value(T),
    Failure(Failure),
}

impl<T> Completion<T> {
    fn into_outcome(self) -> Outcome<T> {
        match self {
            Self::Value(value) => Outcome::Value(value),
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }
}

/// The at-most-one installed disposal target for future completions.
pub(crate) enum Reaction<T>
where
    T: Send + 'static,
{
    /// A continuation attached via `then`/`and_then`.
    Continue(Box<dyn Continuation<T>>),

    /// A chained downstream promise; the unwrap rule installs these.
    Forward(Promise<T>),

    /// A failure observer attached via `on_failure`.
    ObserveFailure(FailureObserver),
}

pub(crate) struct Inner<T>
where
    T: Send + 'static,
{
    outcome: Outcome<T>,
    reaction: Option<Reaction<T>>,
}

impl<T> Inner<T>
where
    T: Send + 'static,
{
    /// Moves a settled outcome out of the slot, leaving it empty.
    fn take_settled(&mut self) -> Option<Completion<T>> {
        match mem::replace(&mut self.outcome, Outcome::Empty) {
            Outcome::Empty => None,
            Outcome::Value(value) => Some(Completion::Value(value)),
            Outcome::Failure(failure) => Some(Completion::Failure(failure)),
        }
    }
}

pub(crate) struct SharedState<T>
where
    T: Send + 'static,
{
    inner: Mutex<Inner<T>>,
    settled: Condvar,
}

impl<T> SharedState<T>
where
    T: Send + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                outcome: Outcome::Empty,
                reaction: None,
            }),
            settled: Condvar::new(),
        }
    }

    /// Commits a completion event.
    ///
    /// If a reaction is installed it is removed under the lock and invoked
    /// after the lock is released; otherwise the outcome is stored and all
    /// blocked retrievers are woken.
    pub(crate) fn complete(&self, completion: Completion<T>) {
        let pending = {
            let mut inner = self.inner.lock();
            match inner.reaction.take() {
                Some(reaction) => Some((reaction, completion)),
                None => {
                    inner.outcome = completion.into_outcome();
                    self.settled.notify_all();
                    None
                }
            }
        };

        if let Some((reaction, completion)) = pending {
            dispatch(reaction, completion);
        }
    }

    /// Installs a reaction. If the state has already settled, the reaction
    /// instead runs immediately with the settled outcome, outside the lock.
    pub(crate) fn attach(&self, reaction: Reaction<T>) {
        let pending = {
            let mut inner = self.inner.lock();
            match inner.take_settled() {
                None => {
                    debug_assert!(
                        inner.reaction.is_none(),
                        "a consumer handle can install at most one reaction"
                    );
                    inner.reaction = Some(reaction);
                    return;
                }
                Some(settled) => (reaction, settled),
            }
        };

        let (reaction, settled) = pending;
        dispatch(reaction, settled);
    }

    /// Blocks until the state settles, then moves the outcome out.
    pub(crate) fn wait_settled(&self) -> Completion<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(settled) = inner.take_settled() {
                return settled;
            }
            self.settled.wait(&mut inner);
        }
    }

    /// A coarse description of the state, for `Debug` output on the handles.
    pub(crate) fn status(&self) -> &'static str {
        let inner = self.inner.lock();
        if inner.reaction.is_some() {
            return "reaction installed";
        }
        match inner.outcome {
            Outcome::Empty => "pending",
            Outcome::Value(_) => "value ready",
            Outcome::Failure(_) => "failed",
        }
    }
}

/// Runs one reaction with one completion. Callers must not hold the state
/// lock; every arm may execute user code.
fn dispatch<T>(reaction: Reaction<T>, completion: Completion<T>)
where
    T: Send + 'static,
{
    match (reaction, completion) {
        (Reaction::Continue(continuation), Completion::Value(value)) => {
            continuation.on_value(value);
        }
        (Reaction::Continue(continuation), Completion::Failure(failure)) => {
            continuation.on_failure(failure);
        }
        (Reaction::Forward(downstream), Completion::Value(value)) => {
            downstream.fulfill_value(value);
        }
        (Reaction::Forward(downstream), Completion::Failure(failure)) => {
            downstream.fulfill_failure(failure);
        }
        (Reaction::ObserveFailure(observer), Completion::Failure(failure)) => {
            observer(failure);
        }
        (Reaction::ObserveFailure(observer), Completion::Value(value)) => {
            // A value retires the observer. No consumer handle can exist once
            // an observer was installed, so the value has nowhere to go.
            drop(observer);
            drop(value);
        }
    }
}
