//! Degenerate sources: a single value, nothing, silence, or an immediate
//! error. Mostly building blocks for composing and testing combinators.

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};
use std::{convert::Infallible, marker::PhantomData};

/// Emits exactly one value, then completes.
pub fn of<Item>(value: Item) -> Of<Item> { Of(value) }

#[derive(Clone)]
pub struct Of<Item>(Item);

impl<Item, O> Observable<Item, Infallible, O> for Of<Item>
where
  O: Observer<Item, Infallible>,
{
  fn actual_subscribe(self, mut observer: O) {
    observer.next(self.0);
    observer.complete();
  }
}

impl<Item> ObservableExt<Item, Infallible> for Of<Item> {}

/// Emits nothing and completes immediately.
pub fn empty<Item>() -> Empty<Item> { Empty(PhantomData) }

pub struct Empty<Item>(PhantomData<Item>);

impl<Item> Clone for Empty<Item> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<Item, Err, O> Observable<Item, Err, O> for Empty<Item>
where
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, mut observer: O) { observer.complete(); }
}

impl<Item, Err> ObservableExt<Item, Err> for Empty<Item> {}

/// Emits nothing and never terminates.
pub fn never<Item>() -> Never<Item> { Never(PhantomData) }

pub struct Never<Item>(PhantomData<Item>);

impl<Item> Clone for Never<Item> {
  fn clone(&self) -> Self { Never(PhantomData) }
}

impl<Item, Err, O> Observable<Item, Err, O> for Never<Item>
where
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, _observer: O) {}
}

impl<Item, Err> ObservableExt<Item, Err> for Never<Item> {}

/// Emits no values and errors immediately.
pub fn throw<Item, Err>(err: Err) -> Throw<Item, Err> { Throw(err, PhantomData) }

pub struct Throw<Item, Err>(Err, PhantomData<Item>);

impl<Item, Err: Clone> Clone for Throw<Item, Err> {
  fn clone(&self) -> Self { Throw(self.0.clone(), PhantomData) }
}

impl<Item, Err, O> Observable<Item, Err, O> for Throw<Item, Err>
where
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, mut observer: O) { observer.error(self.0); }
}

impl<Item, Err> ObservableExt<Item, Err> for Throw<Item, Err> {}
