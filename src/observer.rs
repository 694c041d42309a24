//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern:
//! values arrive through `next`/`next_by_ref`, a stream ends with exactly one
//! `error` or `complete`, and the producer wires cancellation back through
//! `set_upstream`.

use std::sync::{Arc, Mutex};

use crate::disposable::BoxedDisposable;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: the consumer of data in reactive programming.
///
/// An observer receives values, an opaque error, and completion notifications
/// from an observable. Delivery methods are not reentrant-safe by default: a
/// producer must not call into one observer from two threads at once without
/// external serialization (the merge combinator provides exactly that for its
/// outer observer).
///
/// Once `error` or `complete` has been delivered, no further delivery may
/// occur. This layer does not police the rule at runtime; each combinator
/// enforces it for its own outer observer, and [`Subscriber`] enforces it at
/// the subscription boundary.
///
/// [`Subscriber`]: crate::subscriber::Subscriber
pub trait Observer<Item, Err> {
  /// Hand the observer the disposable controlling its upstream producer.
  ///
  /// Observers that cannot cancel may ignore it; the default does.
  fn set_upstream(&mut self, _upstream: BoxedDisposable) {}

  /// `true` once the observer will not accept more values. Producers poll
  /// this between emissions to stop early.
  fn is_disposed(&self) -> bool { false }

  /// Receive the next value by move.
  fn next(&mut self, value: Item);

  /// Receive the next value by shared reference.
  ///
  /// Producers that fan one value out to several observers deliver through
  /// this entry; a consuming observer clones.
  fn next_by_ref(&mut self, value: &Item);

  /// Terminal: the stream failed. The error is forwarded verbatim, never
  /// inspected by the core.
  fn error(&mut self, err: Err);

  /// Terminal: the stream ran out of values.
  fn complete(&mut self);
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Blanket adapter turning a closure into an observer.
///
/// Enables `observable.subscribe(|v| ...)`: the closure becomes the `next`
/// handler while terminal events are ignored.
#[derive(Clone)]
pub struct FnObserver<F>(pub F);

impl<F, Item, Err> Observer<Item, Err> for FnObserver<F>
where
  F: FnMut(Item),
  Item: Clone,
{
  #[inline]
  fn next(&mut self, value: Item) { (self.0)(value) }

  #[inline]
  fn next_by_ref(&mut self, value: &Item) { (self.0)(value.clone()) }

  fn error(&mut self, _err: Err) {}

  fn complete(&mut self) {}
}

/// Closure adapter with handlers for all three event kinds.
#[derive(Clone)]
pub struct AllObserver<N, E, C> {
  pub next: N,
  pub error: E,
  pub complete: C,
}

impl<N, E, C, Item, Err> Observer<Item, Err> for AllObserver<N, E, C>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
  Item: Clone,
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn next_by_ref(&mut self, value: &Item) { (self.next)(value.clone()) }

  #[inline]
  fn error(&mut self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(&mut self) { (self.complete)() }
}

// ============================================================================
// DynamicObserver - type-erased, reference-counted observer
// ============================================================================

/// Type-erased observer sharing one concrete observer among many holders.
///
/// The `Arc` is the reference-counted cell; the trait-object fat pointer
/// carries the per-type dispatch table, built once per concrete type by the
/// compiler. Cloning bumps the count and copies the table pointer: O(1), no
/// allocation. Every capability call is one lock plus one indirection through
/// the table, with no dynamic type check and no downcast.
///
/// The mutex doubles as the serialization the [`Observer`] contract requires
/// when one erased observer is shared across threads; the merge combinator
/// relies on this by handing clones of a single `DynamicObserver` to every
/// inner subscription.
pub struct DynamicObserver<Item, Err>(Arc<Mutex<dyn Observer<Item, Err> + Send>>);

impl<Item, Err> Clone for DynamicObserver<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item: 'static, Err: 'static> DynamicObserver<Item, Err> {
  pub fn new<O>(observer: O) -> Self
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let cell: Arc<Mutex<dyn Observer<Item, Err> + Send>> = Arc::new(Mutex::new(observer));
    Self(cell)
  }
}

impl<Item, Err> Observer<Item, Err> for DynamicObserver<Item, Err> {
  fn set_upstream(&mut self, upstream: BoxedDisposable) {
    self.0.lock().unwrap().set_upstream(upstream)
  }

  fn is_disposed(&self) -> bool { self.0.lock().unwrap().is_disposed() }

  fn next(&mut self, value: Item) { self.0.lock().unwrap().next(value) }

  fn next_by_ref(&mut self, value: &Item) { self.0.lock().unwrap().next_by_ref(value) }

  fn error(&mut self, err: Err) { self.0.lock().unwrap().error(err) }

  fn complete(&mut self) { self.0.lock().unwrap().complete() }
}

// ============================================================================
// Tests
// ============================================================================
