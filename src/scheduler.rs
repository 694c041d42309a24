//! Cooperative current-thread task queue.
//!
//! A single logical queue is confined to each thread. A combinator whose
//! `subscribe` may synchronously trigger nested subscriptions (merge is the
//! motivating case) claims ownership of the queue at the start of the call;
//! tasks scheduled while the queue is owned are deferred and run by the owner
//! instead of recursing, which keeps deeply nested synchronous emissions from
//! growing the call stack without bound and guarantees no deferred task runs
//! twice.

use std::{cell::RefCell, collections::VecDeque};

type Task = Box<dyn FnOnce()>;

thread_local! {
  // `Some` while an owner exists on this thread.
  static QUEUE: RefCell<Option<VecDeque<Task>>> = const { RefCell::new(None) };
}

/// Claim this thread's queue if nobody owns it yet.
///
/// The returned guard drains the queue on every exit path, including panics,
/// before releasing ownership. If an enclosing call already owns the queue
/// the guard is inert: the existing owner drains.
#[must_use]
pub fn own_queue_and_drain_on_exit() -> DrainGuard {
  let owned = QUEUE.with(|queue| {
    let mut queue = queue.borrow_mut();
    if queue.is_none() {
      *queue = Some(VecDeque::new());
      true
    } else {
      false
    }
  });
  DrainGuard { owned }
}

/// Run `task` now, or defer it onto the queue when an enclosing call on this
/// thread already owns it.
///
/// When unowned, the caller becomes the owner for the duration: the task runs
/// immediately and everything it schedules is drained before `schedule`
/// returns.
pub fn schedule(task: impl FnOnce() + 'static) {
  let run_now = QUEUE.with(|queue| {
    let mut queue = queue.borrow_mut();
    match queue.as_mut() {
      Some(tasks) => {
        tasks.push_back(Box::new(task));
        None
      }
      None => Some(task),
    }
  });
  if let Some(task) = run_now {
    let _drain = own_queue_and_drain_on_exit();
    task();
  }
}

/// Scope guard returned by [`own_queue_and_drain_on_exit`].
pub struct DrainGuard {
  owned: bool,
}

impl DrainGuard {
  /// `true` when this guard actually claimed ownership.
  #[inline]
  pub fn is_owner(&self) -> bool { self.owned }
}

impl Drop for DrainGuard {
  fn drop(&mut self) {
    if !self.owned {
      return;
    }
    // Tasks may schedule further tasks while draining; keep popping until
    // the queue is empty, then release ownership.
    loop {
      let task = QUEUE.with(|queue| queue.borrow_mut().as_mut().and_then(VecDeque::pop_front));
      match task {
        Some(task) => task(),
        None => break,
      }
    }
    QUEUE.with(|queue| *queue.borrow_mut() = None);
  }
}
