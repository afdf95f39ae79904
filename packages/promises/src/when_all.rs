//! Fan-in aggregation over collections of futures.
//!
//! Every input gets two attachment points: a value continuation that records
//! the slot value, and a failure observer (on the future returned by that
//! continuation) that records the slot failure. Failures never reach the
//! value continuation, so the observer is what keeps the countdown honest.
//! The participant whose decrement drives the countdown to zero is the one
//! that fulfills the aggregate promise, exactly once, regardless of how
//! successes and failures interleave.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{AggregateError, Failure, Future, Promise};

/// Shared bookkeeping for one aggregation: the countdown, the per-slot
/// failure buffer and the take-once aggregate promise. Value buffers live
/// with the callers because their shape differs between the sequence and
/// tuple forms.
struct GatherCore<Out>
where
    Out: Send + 'static,
{
    countdown: AtomicUsize,
    failure_count: AtomicUsize,
    failures: Mutex<Vec<Option<Failure>>>,
    aggregate: Mutex<Option<Promise<Out>>>,
}

impl<Out> GatherCore<Out>
where
    Out: Send + 'static,
{
    fn new(count: usize, aggregate: Promise<Out>) -> Self {
        Self {
            countdown: AtomicUsize::new(count),
            failure_count: AtomicUsize::new(0),
            failures: Mutex::new(vec![None; count]),
            aggregate: Mutex::new(Some(aggregate)),
        }
    }

    /// A slot completed with a value. The last arrival fulfills the
    /// aggregate, with `collect` assembling the value buffer if every slot
    /// succeeded.
    fn arrive_value(&self, collect: impl FnOnce() -> Out) {
        if !self.is_last_arrival() {
            return;
        }

        if self.failure_count.load(Ordering::Relaxed) > 0 {
            self.fulfill_failed();
        } else {
            self.take_aggregate().fulfill_value(collect());
        }
    }

    /// A slot completed with a failure.
    fn record_failure(&self, index: usize, failure: Failure) {
        self.failures.lock()[index] = Some(failure);
        self.failure_count.fetch_add(1, Ordering::Relaxed);

        if self.is_last_arrival() {
            self.fulfill_failed();
        }
    }

    /// Decrements the countdown. The release half publishes this slot's
    /// buffer writes; the final decrement's acquire half observes all of them.
    fn is_last_arrival(&self) -> bool {
        self.countdown.fetch_sub(1, Ordering::AcqRel) == 1
    }

    fn fulfill_failed(&self) {
        let children: Vec<(usize, Failure)> = self
            .failures
            .lock()
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.take().map(|failure| (index, failure)))
            .collect();

        self.take_aggregate()
            .fulfill_failure(Failure::new(AggregateError::new(children)));
    }

    fn take_aggregate(&self) -> Promise<Out> {
        self.aggregate
            .lock()
            .take()
            .expect("the aggregate promise is fulfilled exactly once")
    }
}

/// Aggregates a homogeneous collection of futures into a future of all their
/// values, in input order.
///
/// The output settles once every input has settled. If any input failed, the
/// output fails with an [`AggregateError`] carrying every child failure with
/// its input position, in input order; no partial values are exposed. An
/// empty collection yields an immediately-available empty `Vec`.
///
/// # Examples
///
/// ```rust
/// use promises::{when_all, Promise};
///
/// let (mut first, a) = Promise::pair();
/// let (mut second, b) = Promise::pair();
///
/// let all = when_all([a, b]);
///
/// // Completion order does not matter; positions are preserved.
/// second.set_value(2).unwrap();
/// first.set_value(1).unwrap();
///
/// assert_eq!(all.get().unwrap(), vec![1, 2]);
/// ```
#[must_use]
pub fn when_all<T, I>(futures: I) -> Future<Vec<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = Future<T>>,
{
    let futures: Vec<Future<T>> = futures.into_iter().collect();
    let (aggregate, result) = Promise::pair();

    if futures.is_empty() {
        aggregate.fulfill_value(Vec::new());
        return result;
    }

    let core = Arc::new(GatherCore::new(futures.len(), aggregate));
    let values: Arc<Mutex<Vec<Option<T>>>> =
        Arc::new(Mutex::new((0..futures.len()).map(|_| None).collect()));

    for (index, future) in futures.into_iter().enumerate() {
        let slot_core = Arc::clone(&core);
        let slot_values = Arc::clone(&values);
        let forwarded = future.then(move |value| {
            slot_values.lock()[index] = Some(value);

            let collect_values = Arc::clone(&slot_values);
            slot_core.arrive_value(move || {
                collect_values
                    .lock()
                    .iter_mut()
                    .map(|slot| slot.take().expect("every input recorded a value"))
                    .collect()
            });
        });

        let slot_core = Arc::clone(&core);
        forwarded.on_failure(move |failure| slot_core.record_failure(index, failure));
    }

    result
}

macro_rules! when_all_tuple {
    ($(#[$doc:meta])* $name:ident, $arity:expr => $(($T:ident, $future:ident, $idx:tt)),+) => {
        $(#[$doc])*
        #[must_use]
        pub fn $name<$($T),+>($($future: Future<$T>),+) -> Future<($($T,)+)>
        where
            $($T: Send + 'static,)+
        {
            let (aggregate, result) = Promise::pair();
            let core = Arc::new(GatherCore::new($arity, aggregate));
            let values = Arc::new(Mutex::new(($(Option::<$T>::None,)+)));

            let collect: Arc<dyn Fn() -> ($($T,)+) + Send + Sync> = {
                let values = Arc::clone(&values);
                Arc::new(move || {
                    let mut slots = values.lock();
                    ($(slots.$idx.take().expect("every input recorded a value"),)+)
                })
            };

            $(
                let slot_core = Arc::clone(&core);
                let slot_values = Arc::clone(&values);
                let slot_collect = Arc::clone(&collect);
                let forwarded = $future.then(move |value| {
                    slot_values.lock().$idx = Some(value);
                    slot_core.arrive_value(&*slot_collect);
                });

                let slot_core = Arc::clone(&core);
                forwarded.on_failure(move |failure| slot_core.record_failure($idx, failure));
            )+

            result
        }
    };
}

when_all_tuple! {
    /// Aggregates two futures of possibly different types into a future of
    /// the pair, in positional order.
    ///
    /// Failure semantics match [`when_all`]: the output fails with an
    /// [`AggregateError`] if either input fails, after both have settled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use promises::{when_all2, Promise};
    ///
    /// let (mut first, a) = Promise::pair();
    /// let (mut second, b) = Promise::pair();
    ///
    /// let both = when_all2(a, b);
    ///
    /// first.set_value(7).unwrap();
    /// second.set_value("seven".to_string()).unwrap();
    ///
    /// assert_eq!(both.get().unwrap(), (7, "seven".to_string()));
    /// ```
    when_all2, 2 => (A, future_a, 0), (B, future_b, 1)
}

when_all_tuple! {
    /// Aggregates three futures of possibly different types into a future of
    /// the triple. See [`when_all2`].
    when_all3, 3 => (A, future_a, 0), (B, future_b, 1), (C, future_c, 2)
}

when_all_tuple! {
    /// Aggregates four futures of possibly different types into a future of
    /// the quadruple. See [`when_all2`].
    when_all4, 4 => (A, future_a, 0), (B, future_b, 1), (C, future_c, 2), (D, future_d, 3)
}

when_all_tuple! {
    /// Aggregates five futures of possibly different types into a future of
    /// the quintuple. See [`when_all2`].
    when_all5, 5 => (A, future_a, 0), (B, future_b, 1), (C, future_c, 2), (D, future_d, 3), (E, future_e, 4)
}
