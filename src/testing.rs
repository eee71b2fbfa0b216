//! Utilities for the test suite.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use crate::stream::Stream;


/// The identity function.
pub fn id<T>(t: T) -> T { t }

/// Record every value a stream publishes from now on.
pub fn record<T: Clone + 'static>(stream: &Stream<T>) -> Rc<RefCell<Vec<T>>> {
    let seen = Rc::new(RefCell::new(vec![]));
    stream.subscribe_fn({
        let seen = seen.clone();
        move |value: &T| seen.borrow_mut().push(value.clone())
    });
    seen
}

/// Trace equality of two streams.
///
/// Records both streams from now on and keeps them alive. The returned check
/// compares everything published so far.
pub fn stream_eq<T>(a: &Stream<T>, b: &Stream<T>) -> impl Fn() -> Result<(), String>
    where T: Clone + PartialEq + Debug + 'static
{
    let streams = (a.clone(), b.clone());
    let (left, right) = (record(a), record(b));
    move || {
        let _alive = &streams;
        if *left.borrow() == *right.borrow() {
            Ok(())
        } else {
            Err(format!("{:?} != {:?}", left.borrow(), right.borrow()))
        }
    }
}

/// A root stream counting how often it was opened and closed.
pub fn counting_hooks<T>(capacity: usize) -> (Rc<Cell<usize>>, Rc<Cell<usize>>, Stream<T>)
    where T: Clone + 'static
{
    let opened = Rc::new(Cell::new(0));
    let closed = Rc::new(Cell::new(0));
    let stream = Stream::with_lifecycle(
        capacity,
        { let opened = opened.clone(); move |_: &Stream<T>| opened.set(opened.get() + 1) },
        { let closed = closed.clone(); move |_: &Stream<T>| closed.set(closed.get() + 1) },
    );
    (opened, closed, stream)
}


/// Self-tests.
mod test {
    use super::*;

    #[test]
    fn record_sees_later_values_only() {
        let stream = Stream::unbounded();
        stream.push(1);
        let seen = record(&stream);
        stream.push(2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn stream_eq_same_stream() {
        let stream = Stream::new(0);
        let eq = stream_eq(&stream, &stream);
        stream.feed(vec!['a', 'b']);
        assert_eq!(eq(), Ok(()));
    }

    #[test]
    fn stream_eq_detects_difference() {
        let a = Stream::new(0);
        let b = Stream::new(0);
        let eq = stream_eq(&a, &b);
        a.push(1);
        assert!(eq().is_err());
        b.push(1);
        assert_eq!(eq(), Ok(()));
    }

    #[test]
    fn counting_hooks_start_at_zero() {
        let (opened, closed, stream) = counting_hooks::<u8>(1);
        assert_eq!((opened.get(), closed.get()), (0, 0));
        assert_eq!(stream.capacity(), crate::Capacity::Bounded(1));
    }
}
