//! Observable trait and the extension methods every source gets.

use crate::{
  disposable::CompositeDisposable,
  observable::connectable::ConnectableObservable,
  observer::{AllObserver, FnObserver, Observer},
  ops::merge::{MergeAllOp, MergeOp},
  subject::Subject,
  subscriber::Subscriber,
};

mod create;
mod trivial;
pub use create::{create, Create};
pub use trivial::{empty, never, of, throw, Empty, Never, Of, Throw};
mod from_iter;
pub use from_iter::{from_iter, FromIter};
pub mod connectable;

/// A description of how to produce values of type `Item` for one observer.
///
/// Subscribing consumes the descriptor and returns nothing: cancellation
/// flows exclusively through the disposable the producer hands the observer
/// via `set_upstream`. The convenience methods on [`ObservableExt`] wrap the
/// observer in a [`Subscriber`] and return its handle, which is how callers
/// normally obtain one.
pub trait Observable<Item, Err, O: Observer<Item, Err>> {
  fn actual_subscribe(self, observer: O);
}

/// Combinators and subscription conveniences available on every observable.
pub trait ObservableExt<Item, Err>: Sized {
  /// Subscribe with a closure receiving each value; terminal events are
  /// ignored. Returns the handle that cancels the subscription.
  fn subscribe<N>(self, next: N) -> CompositeDisposable
  where
    N: FnMut(Item),
    Item: Clone,
    Self: Observable<Item, Err, Subscriber<FnObserver<N>>>,
  {
    self.subscribe_observer(FnObserver(next))
  }

  /// Subscribe with closures for values, the error and completion.
  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> CompositeDisposable
  where
    N: FnMut(Item),
    E: FnMut(Err),
    C: FnMut(),
    Item: Clone,
    Self: Observable<Item, Err, Subscriber<AllObserver<N, E, C>>>,
  {
    self.subscribe_observer(AllObserver { next, error, complete })
  }

  /// Subscribe with a full [`Observer`] implementation.
  fn subscribe_observer<O>(self, observer: O) -> CompositeDisposable
  where
    O: Observer<Item, Err>,
    Self: Observable<Item, Err, Subscriber<O>>,
  {
    let subscriber = Subscriber::new(observer);
    let handle = subscriber.handle();
    self.actual_subscribe(subscriber);
    handle
  }

  /// Combine this observable with another of the same value type, merging
  /// their emissions into one serialized stream. Completes once both
  /// complete; errors the instant either errors.
  fn merge<S>(self, other: S) -> MergeOp<Self, S> { MergeOp::new(self, other) }

  /// Flatten an observable of observables by subscribing to every inner
  /// observable as it arrives and merging all their emissions.
  fn merge_all(self) -> MergeAllOp<Self, Item> { MergeAllOp::new(self) }

  /// Bridge this observable into a multicast [`Subject`], deferring the
  /// subscription to `self` until [`connect`] is invoked.
  ///
  /// [`connect`]: ConnectableObservable::connect
  fn multicast(self) -> ConnectableObservable<Self, Item, Err> {
    ConnectableObservable::new(self, Subject::new())
  }

  /// Alias for [`multicast`](ObservableExt::multicast).
  fn publish(self) -> ConnectableObservable<Self, Item, Err> { self.multicast() }
}
