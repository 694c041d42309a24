//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Disposables
pub use crate::disposable::{
  BoxedDisposable, CallbackDisposable, CompositeDisposable, Disposable,
};
// Observable trait, extension methods and sources
pub use crate::observable::{
  connectable::ConnectableObservable, create, empty, from_iter, never, of, throw, Observable,
  ObservableExt,
};
// Observer trait and adapters
pub use crate::observer::{AllObserver, DynamicObserver, FnObserver, Observer};
// Merge operators
pub use crate::ops::merge::{MergeAllOp, MergeOp};
// Cooperative current-thread queue
pub use crate::scheduler::{own_queue_and_drain_on_exit, schedule, DrainGuard};
// Subject
pub use crate::subject::Subject;
// Subscriber
pub use crate::subscriber::Subscriber;
