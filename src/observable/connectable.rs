//! ConnectableObservable: the multicast gate.
//!
//! Bridges a source observable into a [`Subject`] but deliberately defers
//! subscribing to the source until [`connect`] is invoked, so several
//! consumers can attach to the subject first and all observe the same
//! subsequent emissions.
//!
//! [`connect`]: ConnectableObservable::connect

use std::sync::{Arc, Mutex};

use crate::{
  disposable::{BoxedDisposable, CallbackDisposable, CompositeDisposable, Disposable},
  observable::{Observable, ObservableExt},
  observer::Observer,
  subject::Subject,
  subscriber::Subscriber,
};

/// An observable that starts producing only when explicitly connected.
///
/// Subscribing attaches to the internal subject and does not start the
/// source. The bridge holds at most one live connection at a time: `connect`
/// while connected is a no-op, and only the first of several racing callers
/// actually subscribes the source. The shared state outlives individual
/// connect/disconnect cycles.
pub struct ConnectableObservable<S, Item, Err> {
  source: S,
  subject: Subject<Item, Err>,
  state: Arc<ConnectState>,
}

struct ConnectState {
  // `Some` while a connection cycle is live.
  live: Mutex<Option<CompositeDisposable>>,
}

impl<S: Clone, Item, Err> Clone for ConnectableObservable<S, Item, Err> {
  fn clone(&self) -> Self {
    ConnectableObservable {
      source: self.source.clone(),
      subject: self.subject.clone(),
      state: self.state.clone(),
    }
  }
}

impl<S, Item, Err> ConnectableObservable<S, Item, Err> {
  pub(crate) fn new(source: S, subject: Subject<Item, Err>) -> Self {
    ConnectableObservable {
      source,
      subject,
      state: Arc::new(ConnectState { live: Mutex::new(None) }),
    }
  }

  /// Another handle onto the multicast subject, for attaching consumers.
  #[inline]
  pub fn fork(&self) -> Subject<Item, Err> { self.subject.clone() }
}

impl<S, Item, Err> ConnectableObservable<S, Item, Err>
where
  S: Observable<Item, Err, Subscriber<Subject<Item, Err>>> + Clone,
  Err: Clone,
{
  /// Subscribe the source into the subject, starting emissions.
  ///
  /// Returns the handle that disconnects the source again.
  pub fn connect(&self) -> CompositeDisposable { self.connect_with(CompositeDisposable::new()) }

  /// Like [`connect`](Self::connect), but ties the connection's teardown to
  /// a caller-supplied handle.
  ///
  /// If a connection is already live this is a no-op returning `handle`
  /// unchanged; under concurrent callers only the first wins. Disposing the
  /// returned handle swaps the stored connection out under the state lock
  /// and disposes it outside the lock, so consumer teardown callbacks that
  /// re-enter connect/disconnect cannot deadlock.
  pub fn connect_with(&self, handle: CompositeDisposable) -> CompositeDisposable {
    {
      let mut live = self.state.live.lock().unwrap();
      if live.is_some() {
        return handle;
      }
      let connection = CompositeDisposable::new();
      *live = Some(connection.clone());
      self
        .source
        .clone()
        .actual_subscribe(Subscriber::with_upstream(self.subject.clone(), connection));
    }

    let state = self.state.clone();
    handle.add(BoxedDisposable::new(CallbackDisposable::new(move || {
      let swapped = state.live.lock().unwrap().take();
      if let Some(mut connection) = swapped {
        connection.dispose();
      }
    })));
    handle
  }
}

/// Subscribing side: delegates to the multicast subject.
impl<S, Item, Err, O> Observable<Item, Err, O> for ConnectableObservable<S, Item, Err>
where
  Subject<Item, Err>: Observable<Item, Err, O>,
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, observer: O) { self.subject.actual_subscribe(observer) }
}

impl<S, Item, Err> ObservableExt<Item, Err> for ConnectableObservable<S, Item, Err> {}

/// Feeding side: the bridge is itself an observer, driving the subject.
impl<S, Item, Err> Observer<Item, Err> for ConnectableObservable<S, Item, Err>
where
  Err: Clone,
{
  #[inline]
  fn is_disposed(&self) -> bool { self.subject.is_disposed() }

  #[inline]
  fn next(&mut self, value: Item) { self.subject.next(value) }

  #[inline]
  fn next_by_ref(&mut self, value: &Item) { self.subject.next_by_ref(value) }

  #[inline]
  fn error(&mut self, err: Err) { self.subject.error(err) }

  #[inline]
  fn complete(&mut self) { self.subject.complete() }
}
