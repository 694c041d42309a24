//! Publish subject: the multicast sink.
//!
//! A `Subject` is both an observer (values fed in) and an observable
//! (observers registered), broadcasting every event it receives to every
//! observer registered at that moment. Clones share one stream.

use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc, Mutex,
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::{DynamicObserver, Observer},
};

pub struct Subject<Item, Err> {
  observers: Arc<Mutex<Vec<DynamicObserver<Item, Err>>>>,
  stopped: Arc<AtomicBool>,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self {
    Subject { observers: self.observers.clone(), stopped: self.stopped.clone() }
  }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self {
    Subject {
      observers: Arc::new(Mutex::new(vec![])),
      stopped: Arc::new(AtomicBool::new(false)),
    }
  }
}

/// Broadcasting side. One incoming value fans out by reference; disposed
/// registrations are pruned as they are encountered. The first terminal
/// event stops the subject and clears the registry.
impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Err: Clone,
{
  fn is_disposed(&self) -> bool { self.stopped.load(Ordering::Relaxed) }

  fn next(&mut self, value: Item) { self.next_by_ref(&value) }

  fn next_by_ref(&mut self, value: &Item) {
    if self.stopped.load(Ordering::Relaxed) {
      return;
    }
    let mut observers = self.observers.lock().unwrap();
    observers.retain_mut(|observer| {
      if observer.is_disposed() {
        return false;
      }
      observer.next_by_ref(value);
      true
    });
  }

  fn error(&mut self, err: Err) {
    if self.stopped.swap(true, Ordering::Relaxed) {
      return;
    }
    let mut observers = std::mem::take(&mut *self.observers.lock().unwrap());
    for observer in observers.iter_mut() {
      if !observer.is_disposed() {
        observer.error(err.clone());
      }
    }
  }

  fn complete(&mut self) {
    if self.stopped.swap(true, Ordering::Relaxed) {
      return;
    }
    let mut observers = std::mem::take(&mut *self.observers.lock().unwrap());
    for observer in observers.iter_mut() {
      if !observer.is_disposed() {
        observer.complete();
      }
    }
  }
}

/// Subscribing side. A late subscriber to a stopped subject is dropped
/// without receiving anything.
impl<Item, Err, O> Observable<Item, Err, O> for Subject<Item, Err>
where
  Item: 'static,
  Err: 'static,
  O: Observer<Item, Err> + Send + 'static,
{
  fn actual_subscribe(self, observer: O) {
    if self.stopped.load(Ordering::Relaxed) {
      return;
    }
    self.observers.lock().unwrap().push(DynamicObserver::new(observer));
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Subject<Item, Err> {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::disposable::Disposable;
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn broadcasts_to_every_observer() {
    let first = Arc::new(Mutex::new(vec![]));
    let second = Arc::new(Mutex::new(vec![]));
    let c_first = first.clone();
    let c_second = second.clone();

    let mut subject = Subject::<i32, ()>::new();
    subject.clone().subscribe(move |v| c_first.lock().unwrap().push(v));
    subject.clone().subscribe(move |v| c_second.lock().unwrap().push(v));

    subject.next(1);
    subject.next(2);

    assert_eq!(*first.lock().unwrap(), vec![1, 2]);
    assert_eq!(*second.lock().unwrap(), vec![1, 2]);
  }

  #[test]
  fn disposed_observers_are_pruned() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();

    let mut subject = Subject::<i32, ()>::new();
    let mut handle = subject.clone().subscribe(move |v| c_values.lock().unwrap().push(v));

    subject.next(1);
    handle.dispose();
    subject.next(2);

    assert_eq!(*values.lock().unwrap(), vec![1]);
    assert!(subject.observers.lock().unwrap().is_empty());
  }

  #[test]
  fn stops_after_complete() {
    let values = Arc::new(Mutex::new(vec![]));
    let completions = Arc::new(Mutex::new(0));
    let c_values = values.clone();
    let c_completions = completions.clone();

    let mut subject = Subject::<i32, ()>::new();
    subject.clone().subscribe_all(
      move |v| c_values.lock().unwrap().push(v),
      |_| {},
      move || *c_completions.lock().unwrap() += 1,
    );

    subject.next(1);
    subject.complete();
    subject.next(2);
    subject.complete();

    assert_eq!(*values.lock().unwrap(), vec![1]);
    assert_eq!(*completions.lock().unwrap(), 1);
  }

  #[test]
  fn error_delivered_once_to_each() {
    let errors = Arc::new(Mutex::new(vec![]));
    let c_errors = errors.clone();

    let mut subject = Subject::<i32, &'static str>::new();
    subject
      .clone()
      .subscribe_all(|_| {}, move |e| c_errors.lock().unwrap().push(e), || {});

    subject.error("boom");
    subject.error("again");

    assert_eq!(*errors.lock().unwrap(), vec!["boom"]);
  }

  #[test]
  fn late_subscriber_to_stopped_subject_gets_nothing() {
    let hits = Arc::new(Mutex::new(0));
    let c_hits = hits.clone();

    let mut subject = Subject::<i32, ()>::new();
    subject.complete();
    subject.clone().subscribe(move |_| *c_hits.lock().unwrap() += 1);
    subject.next(1);

    assert_eq!(*hits.lock().unwrap(), 0);
  }
}
