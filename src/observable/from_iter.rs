use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};
use std::convert::Infallible;

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted; stops early once the
/// observer reports itself disposed. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// from_iter(0..10).subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> FromIter<Iter>
where
  Iter: IntoIterator,
{
  FromIter(iter)
}

#[derive(Clone)]
pub struct FromIter<Iter>(Iter);

impl<Iter, O> Observable<Iter::Item, Infallible, O> for FromIter<Iter>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Infallible>,
{
  fn actual_subscribe(self, mut observer: O) {
    for value in self.0 {
      if observer.is_disposed() {
        return;
      }
      observer.next(value);
    }
    observer.complete();
  }
}

impl<Iter> ObservableExt<Iter::Item, Infallible> for FromIter<Iter> where Iter: IntoIterator {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::prelude::*;
  use bencher::{benchmark_group, Bencher};

  #[test]
  fn from_range() {
    let mut hit_count = 0;
    let mut completed = false;
    from_iter(0..100).subscribe_all(|_| hit_count += 1, |_| {}, || completed = true);

    assert_eq!(hit_count, 100);
    assert!(completed);
  }

  #[test]
  fn from_vec() {
    let mut collected = vec![];
    from_iter(vec![1, 2, 3]).subscribe(|v| collected.push(v));

    assert_eq!(collected, vec![1, 2, 3]);
  }

  #[test]
  fn stops_when_observer_disposed() {
    let probe = std::rc::Rc::new(std::cell::RefCell::new((0usize, false)));
    struct Recording(std::rc::Rc<std::cell::RefCell<(usize, bool)>>);
    impl Observer<i32, Infallible> for Recording {
      fn is_disposed(&self) -> bool { self.0.borrow().0 >= 3 }

      fn next(&mut self, _: i32) { self.0.borrow_mut().0 += 1; }

      fn next_by_ref(&mut self, _: &i32) { self.0.borrow_mut().0 += 1; }

      fn error(&mut self, _: Infallible) {}

      fn complete(&mut self) { self.0.borrow_mut().1 = true; }
    }

    from_iter(0..100).actual_subscribe(Recording(probe.clone()));

    let (seen, completed) = *probe.borrow();
    assert_eq!(seen, 3);
    assert!(!completed);
  }

  #[test]
  fn bench() { do_bench(); }

  benchmark_group!(do_bench, bench_from_iter);

  fn bench_from_iter(b: &mut Bencher) {
    b.iter(|| {
      let mut count = 0;
      from_iter(0..100).subscribe(|_| count += 1);
      count
    });
  }
}
