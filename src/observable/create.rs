use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Creates an observable from a subscribe function.
///
/// The function is handed the observer and drives it directly: call `next`
/// for each value, then `error` or `complete` exactly once. The observer is
/// passed as `&mut dyn Observer` so the closure stays decoupled from the
/// concrete observer type down the chain.
///
/// # Example
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut sum = 0;
/// create(|observer: &mut dyn Observer<i32, ()>| {
///   observer.next(1);
///   observer.next(2);
///   observer.complete();
/// })
/// .subscribe(|v| sum += v);
/// ```
pub fn create<F, Item, Err>(subscribe: F) -> Create<F>
where
  F: FnOnce(&mut dyn Observer<Item, Err>),
{
  Create(subscribe)
}

#[derive(Clone)]
pub struct Create<F>(F);

impl<F, Item, Err, O> Observable<Item, Err, O> for Create<F>
where
  F: FnOnce(&mut dyn Observer<Item, Err>),
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, mut observer: O) { (self.0)(&mut observer) }
}

impl<F, Item, Err> ObservableExt<Item, Err> for Create<F> where
  F: FnOnce(&mut dyn Observer<Item, Err>)
{
}
