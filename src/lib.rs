//! # rxcore: a reactive-stream engine core
//!
//! A producer/consumer contract ([`Observable`]/[`Observer`]) plus lifecycle
//! management ([`Disposable`]) and the combinators that compose streams while
//! preserving strict delivery and cancellation guarantees. Everything is
//! in-process and in-memory: a producer emits a sequence of values over time
//! to one or more consumers with deterministic teardown.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let sum = Arc::new(Mutex::new(0));
//! let total = sum.clone();
//! from_iter(0..3)
//!   .merge(from_iter(3..6))
//!   .subscribe(move |v| *total.lock().unwrap() += v);
//! assert_eq!(*sum.lock().unwrap(), 15);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A descriptor of how to produce values for one observer |
//! | [`Observer`] | Consumes values, then exactly one `error` or `complete` |
//! | [`Disposable`] | Idempotent cancellation of an active subscription |
//! | [`Subject`] | Multicast sink: observer in, many observers out |
//!
//! Every delivery guarantee the combinators make — serialized output,
//! exactly-once completion, first-error-wins, cascading cancellation — holds
//! under whatever concurrency the caller imposes; the primitives never spawn
//! threads of their own.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Disposable`]: disposable::Disposable
//! [`Subject`]: subject::Subject

pub mod disposable;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscriber;

pub use prelude::*;
