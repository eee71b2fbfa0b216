//! Helper module for reduce

use std::cell::RefCell;

use super::operator::Operator;
use super::{Stream, WeakStream};


/// Combine an optional accumulator with the next value. An empty accumulator
/// is seeded with the value itself.
fn accumulate<T, F>(accumulator: Option<T>, value: &T, reducer: &F) -> T
    where T: Clone,
          F: Fn(T, &T) -> T,
{
    match accumulator {
        Some(acc) => reducer(acc, value),
        None => value.clone(),
    }
}

/// Fold a whole window of values from scratch.
fn fold_window<T, F>(initial: Option<T>, window: &[T], reducer: &F) -> Option<T>
    where T: Clone,
          F: Fn(T, &T) -> T,
{
    window.iter().fold(initial, |acc, value| Some(accumulate(acc, value, reducer)))
}


/// Aggregate an origin's values.
///
/// Over an unbounded origin this is a running fold. Over a bounded origin
/// every step re-folds the origin's current buffer, so values drop out of the
/// aggregate as soon as the origin evicts them.
pub(crate) struct Reduce<T, F> {
    origin: WeakStream<T>,
    reducer: F,
    initial: Option<T>,
    running: RefCell<Option<T>>,
    incremental: bool,
}

impl<T, F> Reduce<T, F>
    where T: Clone + 'static,
          F: Fn(T, &T) -> T,
{
    pub fn new(origin: &Stream<T>, reducer: F, initial: Option<T>) -> Reduce<T, F> {
        Reduce {
            origin: origin.downgrade(),
            reducer,
            running: RefCell::new(initial.clone()),
            initial,
            incremental: origin.capacity().is_unbounded(),
        }
    }
}

impl<T, F> Operator<T> for Reduce<T, F>
    where T: Clone + 'static,
          F: Fn(T, &T) -> T,
{
    type Output = T;

    fn step(&self, input: &T, emit: &mut dyn FnMut(T)) {
        if self.incremental {
            let previous = self.running.borrow_mut().take();
            let next = accumulate(previous, input, &self.reducer);
            *self.running.borrow_mut() = Some(next.clone());
            emit(next);
        } else {
            let window = self.origin.upgrade().map(|origin| origin.values()).unwrap_or_default();
            if let Some(total) = fold_window(self.initial.clone(), &window, &self.reducer) {
                emit(total);
            }
        }
    }

    fn reset(&self) {
        *self.running.borrow_mut() = self.initial.clone();
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: i32, b: &i32) -> i32 { a + b }

    fn run<O: Operator<i32, Output = i32>>(operator: &O, inputs: &[i32]) -> Vec<i32> {
        let mut out = vec![];
        for input in inputs {
            operator.step(input, &mut |o| out.push(o));
        }
        out
    }

    #[test]
    fn accumulate_seeds_empty_accumulator() {
        assert_eq!(accumulate(None, &3, &add), 3);
    }

    #[test]
    fn accumulate_combines_using_reducer() {
        assert_eq!(accumulate(Some(5), &4, &|a: i32, b: &i32| a * b), 20);
    }

    #[test]
    fn fold_window_of_nothing() {
        assert_eq!(fold_window(None, &[], &add), None);
        assert_eq!(fold_window(Some(7), &[], &add), Some(7));
    }

    #[test]
    fn fold_window_uses_oldest_as_seed() {
        let calls = RefCell::new(vec![]);
        let total = fold_window(None, &[1, 2, 3], &|a: i32, b: &i32| {
            calls.borrow_mut().push((a, *b));
            a + b
        });
        assert_eq!(total, Some(6));
        assert_eq!(*calls.borrow(), vec![(1, 2), (3, 3)]);
    }

    #[test]
    fn incremental_keeps_running_total() {
        let origin = Stream::unbounded();
        let reduce = Reduce::new(&origin, add, Some(100));
        assert_eq!(run(&reduce, &[1, 2, 3, 4]), vec![101, 103, 106, 110]);
        reduce.reset();
        assert_eq!(run(&reduce, &[1]), vec![101]);
    }

    #[test]
    fn bounded_refolds_origin_window() {
        let origin = Stream::new(2);
        let reduce = Reduce::new(&origin, add, None);
        origin.feed(vec![1, 2, 3]);
        // the window is [2, 3] whatever value triggered the step
        assert_eq!(run(&reduce, &[3]), vec![5]);
        assert_eq!(run(&reduce, &[42]), vec![5]);
    }

    #[test]
    fn bounded_with_empty_window() {
        let origin = Stream::new(0);
        assert_eq!(run(&Reduce::new(&origin, add, None), &[1]), Vec::<i32>::new());
        assert_eq!(run(&Reduce::new(&origin, add, Some(9)), &[1]), vec![9]);
    }
}
