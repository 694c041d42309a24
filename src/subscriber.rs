//! While [`Observer`] is the public contract for consuming values, every
//! observer handed to `subscribe` gets wrapped in a [`Subscriber`] first, in
//! order to attach a cancellation handle and enforce the terminal-state rule
//! at the subscription boundary.

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, Disposable},
  observer::Observer,
};

/// Pairs a raw observer with the composite disposable governing its
/// subscription.
///
/// Delivery is suppressed once the composite (or the wrapped observer) is
/// disposed, and the composite is disposed right after a terminal event, so a
/// misbehaving producer can never deliver past `error`/`complete`. The
/// producer's `set_upstream` lands in the same composite, which is what
/// `subscribe` hands back to the caller as the cancellation handle.
pub struct Subscriber<O> {
  observer: O,
  upstream: CompositeDisposable,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self {
    Subscriber { observer, upstream: CompositeDisposable::new() }
  }

  pub fn with_upstream(observer: O, upstream: CompositeDisposable) -> Self {
    Subscriber { observer, upstream }
  }

  /// Another handle to this subscription's composite disposable.
  #[inline]
  pub fn handle(&self) -> CompositeDisposable { self.upstream.clone() }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn set_upstream(&mut self, upstream: BoxedDisposable) { self.upstream.add(upstream) }

  fn is_disposed(&self) -> bool { self.upstream.is_disposed() || self.observer.is_disposed() }

  fn next(&mut self, value: Item) {
    if !self.is_disposed() {
      self.observer.next(value);
    }
  }

  fn next_by_ref(&mut self, value: &Item) {
    if !self.is_disposed() {
      self.observer.next_by_ref(value);
    }
  }

  fn error(&mut self, err: Err) {
    if !self.is_disposed() {
      self.observer.error(err);
      self.upstream.dispose();
    }
  }

  fn complete(&mut self) {
    if !self.is_disposed() {
      self.observer.complete();
      self.upstream.dispose();
    }
  }
}
