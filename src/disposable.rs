//! Cancellable resource ownership.
//!
//! A [`Disposable`] has exactly two states, active and disposed; the
//! transition happens at most once. [`CompositeDisposable`] aggregates
//! children so a whole subscription tree tears down together.

use smallvec::SmallVec;
use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc, Mutex,
};

/// A cancellable unit of resource ownership.
///
/// `dispose` is idempotent: only the first call has any effect. `is_disposed`
/// is a fast-path check combinators poll to short-circuit further delivery;
/// it may lag a concurrent `dispose` by a moment, but once observed `true` it
/// stays `true`.
pub trait Disposable {
  fn dispose(&mut self);

  fn is_disposed(&self) -> bool;
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
  #[inline]
  fn dispose(&mut self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

/// A type-erased disposable, the currency of `Observer::set_upstream` and
/// `CompositeDisposable::add`.
pub struct BoxedDisposable(Box<dyn Disposable + Send>);

impl BoxedDisposable {
  #[inline]
  pub fn new(disposable: impl Disposable + Send + 'static) -> Self { Self(Box::new(disposable)) }
}

impl Disposable for BoxedDisposable {
  #[inline]
  fn dispose(&mut self) { self.0.dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}

/// A disposable aggregating children; disposing it disposes every child.
///
/// Cloning yields another handle to the same underlying registry. Adding a
/// child to an already-disposed composite disposes the child synchronously
/// instead of registering it, so resources attached after teardown began are
/// never leaked.
#[derive(Clone, Default)]
pub struct CompositeDisposable(Arc<Inner>);

#[derive(Default)]
struct Inner {
  disposed: AtomicBool,
  children: Mutex<SmallVec<[BoxedDisposable; 1]>>,
}

impl CompositeDisposable {
  #[inline]
  pub fn new() -> Self { Self::default() }

  pub fn add(&self, mut child: BoxedDisposable) {
    if self.is_disposed() {
      child.dispose();
      return;
    }
    let mut children = self.0.children.lock().unwrap();
    // The flag may have flipped between the fast-path check and taking the
    // lock; re-check under the lock so the child cannot slip past a
    // concurrent cascade.
    if self.0.disposed.load(Ordering::Acquire) {
      drop(children);
      child.dispose();
    } else {
      children.retain(|c| !c.is_disposed());
      children.push(child);
    }
  }
}

impl Disposable for CompositeDisposable {
  fn dispose(&mut self) {
    // Exactly one caller wins the exchange and runs the cascade.
    if self.0.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    let mut children = std::mem::take(&mut *self.0.children.lock().unwrap());
    for child in children.iter_mut() {
      child.dispose();
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.disposed.load(Ordering::Acquire) }
}

/// Runs a teardown closure at most once when disposed.
pub struct CallbackDisposable(Option<Box<dyn FnOnce() + Send>>);

impl CallbackDisposable {
  #[inline]
  pub fn new(callback: impl FnOnce() + Send + 'static) -> Self { Self(Some(Box::new(callback))) }
}

impl Disposable for CallbackDisposable {
  fn dispose(&mut self) {
    if let Some(callback) = self.0.take() {
      callback();
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_none() }
}
