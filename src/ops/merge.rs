//! Merge: combine concurrently-subscribed observables into one serialized
//! output stream.
//!
//! Two surfaces share the machinery here: [`MergeOp`] merges a fixed pair of
//! observables of the same value type (N-ary by chaining), and
//! [`MergeAllOp`] flattens an observable whose emissions are themselves
//! observables, subscribing to each inner observable as it arrives.
//!
//! All branches feed one [`DynamicObserver`]; a shared [`MergeState`]
//! serializes every delivery to it, counts outstanding completions, and ties
//! every upstream into one composite so cancellation and the error path tear
//! everything down together.

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Mutex, MutexGuard,
};

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, Disposable},
  observable::{Observable, ObservableExt},
  observer::{DynamicObserver, Observer},
  scheduler,
};

/// Merges the emissions of two observables of the same value type.
///
/// Every value from either source is forwarded to the one outer observer,
/// serialized so no two deliveries overlap even when the sources run on
/// different threads. The merged stream completes once both sources have
/// completed, and errors the instant either source errors; after an error
/// every other source is cancelled and later events are dropped.
///
/// # Example
///
/// ```
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let sum = Arc::new(Mutex::new(0));
/// let total = sum.clone();
/// from_iter(0..3)
///   .merge(from_iter(3..6))
///   .subscribe(move |v| *total.lock().unwrap() += v);
/// assert_eq!(*sum.lock().unwrap(), 15);
/// ```
#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  source1: S1,
  source2: S2,
}

impl<S1, S2> MergeOp<S1, S2> {
  #[inline]
  pub(crate) fn new(source1: S1, source2: S2) -> Self { MergeOp { source1, source2 } }
}

impl<S1, S2, Item, Err, O> Observable<Item, Err, O> for MergeOp<S1, S2>
where
  Item: 'static,
  Err: 'static,
  O: Observer<Item, Err> + Send + 'static,
  S1: Observable<Item, Err, MergeInnerObserver<Item, Err>>,
  S2: Observable<Item, Err, MergeInnerObserver<Item, Err>>,
{
  fn actual_subscribe(self, observer: O) {
    // Take ownership of the current-thread queue in case inner sources also
    // use it: nested synchronous emissions drain here, not recursively.
    let _drain = scheduler::own_queue_and_drain_on_exit();

    let state = MergeState::new();
    let mut downstream = DynamicObserver::new(observer);

    // The outer subscription context owes one completion of its own, counted
    // before any source gets a chance to complete synchronously.
    state.increment_pending();
    downstream.set_upstream(BoxedDisposable::new(MergeStateDisposable(state.clone())));

    self
      .source1
      .actual_subscribe(MergeInnerObserver::new(downstream.clone(), state.clone()));
    self
      .source2
      .actual_subscribe(MergeInnerObserver::new(downstream.clone(), state.clone()));

    // Release the outer context; delivers the completion if every source
    // already finished synchronously.
    if state.decrement_pending() {
      state.dispose();
      let _guard = state.lock();
      downstream.complete();
    }
  }
}

impl<S1, S2, Item, Err> ObservableExt<Item, Err> for MergeOp<S1, S2>
where
  S1: ObservableExt<Item, Err>,
  S2: ObservableExt<Item, Err>,
{
}

/// Flattens an observable of observables by merging the emissions of every
/// inner observable into one stream.
///
/// The outer source and each inner observable all count toward completion:
/// the flattened stream completes only after the outer source and every
/// spawned inner observable have completed. A single source emitting one
/// inner observable degenerates to pass-through of that inner stream.
pub struct MergeAllOp<S, InnerOb> {
  source: S,
  _hint: std::marker::PhantomData<InnerOb>,
}

impl<S: Clone, InnerOb> Clone for MergeAllOp<S, InnerOb> {
  fn clone(&self) -> Self { MergeAllOp::new(self.source.clone()) }
}

impl<S, InnerOb> MergeAllOp<S, InnerOb> {
  #[inline]
  pub(crate) fn new(source: S) -> Self {
    MergeAllOp { source, _hint: std::marker::PhantomData }
  }
}

impl<S, InnerOb, Item, Err, O> Observable<Item, Err, O> for MergeAllOp<S, InnerOb>
where
  Item: 'static,
  Err: 'static,
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<InnerOb, Err, MergeOuterObserver<InnerOb, Item, Err>>,
  InnerOb: Observable<Item, Err, MergeInnerObserver<Item, Err>> + Clone + 'static,
{
  fn actual_subscribe(self, observer: O) {
    let _drain = scheduler::own_queue_and_drain_on_exit();

    let state = MergeState::new();
    let mut downstream = DynamicObserver::new(observer);

    state.increment_pending();
    downstream.set_upstream(BoxedDisposable::new(MergeStateDisposable(state.clone())));

    self.source.actual_subscribe(MergeOuterObserver {
      downstream,
      state,
      _hint: std::marker::PhantomData,
    });
  }
}

impl<S, InnerOb, Item, Err> ObservableExt<Item, Err> for MergeAllOp<S, InnerOb>
where
  S: ObservableExt<InnerOb, Err>,
  InnerOb: ObservableExt<Item, Err>,
{
}

// ============================================================================
// Shared state
// ============================================================================

/// State shared by every branch of one merge subscription: the composite
/// cancelling all upstreams together, the count of sources that still owe a
/// completion, and the mutex serializing delivery to the outer observer.
struct MergeState {
  lifetime: CompositeDisposable,
  pending: AtomicUsize,
  serialize: Mutex<()>,
}

impl MergeState {
  fn new() -> Arc<Self> {
    Arc::new(MergeState {
      lifetime: CompositeDisposable::new(),
      pending: AtomicUsize::new(0),
      serialize: Mutex::new(()),
    })
  }

  #[inline]
  fn lock(&self) -> MutexGuard<'_, ()> { self.serialize.lock().unwrap() }

  #[inline]
  fn increment_pending(&self) { self.pending.fetch_add(1, Ordering::Relaxed); }

  /// `true` exactly once, for the 1 -> 0 transition.
  #[inline]
  fn decrement_pending(&self) -> bool { self.pending.fetch_sub(1, Ordering::AcqRel) == 1 }

  #[inline]
  fn add(&self, upstream: BoxedDisposable) { self.lifetime.add(upstream) }

  fn dispose(&self) {
    let mut lifetime = self.lifetime.clone();
    lifetime.dispose();
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.lifetime.is_disposed() }
}

/// Adapter registering the whole merge subscription as a child of the
/// downstream subscription, so external cancellation reaches every source.
struct MergeStateDisposable(Arc<MergeState>);

impl Disposable for MergeStateDisposable {
  fn dispose(&mut self) { self.0.dispose() }

  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}

// ============================================================================
// Observer strategies
// ============================================================================

/// Observer subscribed to each inner source; forwards values to the shared
/// downstream under the serialization lock.
pub struct MergeInnerObserver<Item, Err> {
  downstream: DynamicObserver<Item, Err>,
  state: Arc<MergeState>,
}

impl<Item, Err> MergeInnerObserver<Item, Err> {
  fn new(downstream: DynamicObserver<Item, Err>, state: Arc<MergeState>) -> Self {
    // An inner source owes one completion; count it before its subscribe
    // call runs so a synchronous completion cannot hit zero early.
    state.increment_pending();
    MergeInnerObserver { downstream, state }
  }
}

impl<Item, Err> Observer<Item, Err> for MergeInnerObserver<Item, Err> {
  fn set_upstream(&mut self, upstream: BoxedDisposable) { self.state.add(upstream) }

  fn is_disposed(&self) -> bool { self.state.is_disposed() || self.downstream.is_disposed() }

  fn next(&mut self, value: Item) {
    if self.is_disposed() {
      return;
    }
    let _guard = self.state.lock();
    self.downstream.next(value);
  }

  fn next_by_ref(&mut self, value: &Item) {
    if self.is_disposed() {
      return;
    }
    let _guard = self.state.lock();
    self.downstream.next_by_ref(value);
  }

  fn error(&mut self, err: Err) {
    if self.is_disposed() {
      return;
    }
    // Cancel every other source first; their late emissions then fail the
    // is_disposed check instead of racing this terminal event.
    self.state.dispose();
    let _guard = self.state.lock();
    self.downstream.error(err);
  }

  fn complete(&mut self) {
    if self.is_disposed() {
      return;
    }
    if self.state.decrement_pending() {
      self.state.dispose();
      let _guard = self.state.lock();
      self.downstream.complete();
    }
  }
}

/// Observer subscribed to the outer source of [`MergeAllOp`]; every emission
/// is an inner observable to subscribe.
pub struct MergeOuterObserver<InnerOb, Item, Err> {
  downstream: DynamicObserver<Item, Err>,
  state: Arc<MergeState>,
  _hint: std::marker::PhantomData<InnerOb>,
}

impl<InnerOb, Item, Err> Observer<InnerOb, Err> for MergeOuterObserver<InnerOb, Item, Err>
where
  InnerOb: Observable<Item, Err, MergeInnerObserver<Item, Err>> + Clone,
{
  fn set_upstream(&mut self, upstream: BoxedDisposable) { self.state.add(upstream) }

  fn is_disposed(&self) -> bool { self.state.is_disposed() || self.downstream.is_disposed() }

  fn next(&mut self, inner: InnerOb) {
    if self.is_disposed() {
      return;
    }
    inner.actual_subscribe(MergeInnerObserver::new(self.downstream.clone(), self.state.clone()));
  }

  fn next_by_ref(&mut self, inner: &InnerOb) { self.next(inner.clone()) }

  fn error(&mut self, err: Err) {
    if self.is_disposed() {
      return;
    }
    self.state.dispose();
    let _guard = self.state.lock();
    self.downstream.error(err);
  }

  fn complete(&mut self) {
    if self.is_disposed() {
      return;
    }
    if self.state.decrement_pending() {
      self.state.dispose();
      let _guard = self.state.lock();
      self.downstream.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::disposable::Disposable;
  use crate::prelude::*;
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  };

  #[test]
  fn merges_two_subject_streams() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();

    let mut evens = Subject::<i32, ()>::new();
    let mut odds = Subject::<i32, ()>::new();

    evens
      .clone()
      .merge(odds.clone())
      .subscribe(move |v| c_values.lock().unwrap().push(v));

    evens.next(0);
    odds.next(1);
    evens.next(2);
    odds.next(3);

    assert_eq!(*values.lock().unwrap(), vec![0, 1, 2, 3]);
  }

  #[test]
  fn completes_only_after_every_source() {
    let completed = Arc::new(AtomicBool::new(false));
    let c_completed = completed.clone();

    let mut evens = Subject::<i32, ()>::new();
    let mut odds = Subject::<i32, ()>::new();

    evens.clone().merge(odds.clone()).subscribe_all(
      |_| {},
      |_| {},
      move || c_completed.store(true, Ordering::Relaxed),
    );

    evens.complete();
    assert!(!completed.load(Ordering::Relaxed));
    odds.complete();
    assert!(completed.load(Ordering::Relaxed));
  }

  #[test]
  fn completion_delivered_exactly_once() {
    let completions = Arc::new(Mutex::new(0));
    let c_completions = completions.clone();

    let mut evens = Subject::<i32, ()>::new();
    let mut odds = Subject::<i32, ()>::new();

    evens.clone().merge(odds.clone()).subscribe_all(
      |_| {},
      |_| {},
      move || *c_completions.lock().unwrap() += 1,
    );

    evens.complete();
    odds.complete();
    evens.complete();
    odds.complete();

    assert_eq!(*completions.lock().unwrap(), 1);
  }

  #[test]
  fn first_error_wins_and_terminates() {
    let completions = Arc::new(Mutex::new(0));
    let errors = Arc::new(Mutex::new(0));
    let c_completions = completions.clone();
    let c_errors = errors.clone();

    let mut evens = Subject::<i32, &'static str>::new();
    let mut odds = Subject::<i32, &'static str>::new();

    evens.clone().merge(odds.clone()).subscribe_all(
      |_| {},
      move |_| *c_errors.lock().unwrap() += 1,
      move || *c_completions.lock().unwrap() += 1,
    );

    odds.error("first");
    evens.error("second");
    evens.complete();

    assert_eq!(*completions.lock().unwrap(), 0);
    assert_eq!(*errors.lock().unwrap(), 1);
  }

  #[test]
  fn error_cancels_the_other_source() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();

    let mut left = Subject::<i32, &'static str>::new();
    let mut right = Subject::<i32, &'static str>::new();

    left
      .clone()
      .merge(right.clone())
      .subscribe_all(move |v| c_values.lock().unwrap().push(v), |_| {}, || {});

    left.next(1);
    right.error("stop");
    left.next(2);

    assert_eq!(*values.lock().unwrap(), vec![1]);
  }

  #[test]
  fn unsubscribe_stops_delivery() {
    let mut numbers = Subject::<i32, ()>::new();
    let evens = numbers.clone();
    let odds = numbers.clone();

    let mut handle = evens
      .merge(odds)
      .subscribe(|_| unreachable!("delivery after unsubscribe"));
    handle.dispose();

    numbers.next(1);
  }

  #[test]
  fn synchronous_sources_complete_inline() {
    let values = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(AtomicBool::new(false));
    let c_values = values.clone();
    let c_completed = completed.clone();

    from_iter(0..3).merge(from_iter(3..6)).subscribe_all(
      move |v| c_values.lock().unwrap().push(v),
      |_| {},
      move || c_completed.store(true, Ordering::Relaxed),
    );

    assert_eq!(*values.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
    assert!(completed.load(Ordering::Relaxed));
  }

  #[test]
  fn merge_with_empty_is_pass_through() {
    let values = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(AtomicBool::new(false));
    let c_values = values.clone();
    let c_completed = completed.clone();

    let mut source = Subject::<i32, ()>::new();
    source.clone().merge(empty()).subscribe_all(
      move |v| c_values.lock().unwrap().push(v),
      |_| {},
      move || c_completed.store(true, Ordering::Relaxed),
    );

    source.next(7);
    assert!(!completed.load(Ordering::Relaxed));
    source.complete();

    assert_eq!(*values.lock().unwrap(), vec![7]);
    assert!(completed.load(Ordering::Relaxed));
  }

  #[test]
  fn chained_merge_combines_three_sources() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();

    let mut a = Subject::<i32, ()>::new();
    let mut b = Subject::<i32, ()>::new();
    let mut c = Subject::<i32, ()>::new();

    a.clone()
      .merge(b.clone())
      .merge(c.clone())
      .subscribe(move |v| c_values.lock().unwrap().push(v));

    a.next(1);
    b.next(2);
    c.next(3);

    assert_eq!(*values.lock().unwrap(), vec![1, 2, 3]);
  }

  #[test]
  fn merge_all_flattens_inner_observables() {
    let values = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(AtomicBool::new(false));
    let c_values = values.clone();
    let c_completed = completed.clone();

    from_iter(vec![from_iter(0..2), from_iter(2..4)])
      .merge_all()
      .subscribe_all(
        move |v| c_values.lock().unwrap().push(v),
        |_| {},
        move || c_completed.store(true, Ordering::Relaxed),
      );

    assert_eq!(*values.lock().unwrap(), vec![0, 1, 2, 3]);
    assert!(completed.load(Ordering::Relaxed));
  }

  #[test]
  fn merge_all_single_inner_is_pass_through() {
    let values = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(AtomicBool::new(false));
    let c_values = values.clone();
    let c_completed = completed.clone();

    from_iter(vec![from_iter(0..3)]).merge_all().subscribe_all(
      move |v| c_values.lock().unwrap().push(v),
      |_| {},
      move || c_completed.store(true, Ordering::Relaxed),
    );

    assert_eq!(*values.lock().unwrap(), vec![0, 1, 2]);
    assert!(completed.load(Ordering::Relaxed));
  }

  #[test]
  fn merge_all_waits_for_late_inner_sources() {
    let completed = Arc::new(AtomicBool::new(false));
    let c_completed = completed.clone();

    let mut outer = Subject::<Subject<i32, ()>, ()>::new();
    let mut inner = Subject::<i32, ()>::new();

    outer.clone().merge_all().subscribe_all(
      |_| {},
      |_| {},
      move || c_completed.store(true, Ordering::Relaxed),
    );

    outer.next(inner.clone());
    outer.complete();
    // The outer source is done, but the spawned inner still owes a
    // completion.
    assert!(!completed.load(Ordering::Relaxed));

    inner.complete();
    assert!(completed.load(Ordering::Relaxed));
  }
}
