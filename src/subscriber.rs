//! Subscribers and subscriber lists.
//!
//! This is a light-weight implementation of the observer pattern. Observers
//! are anything implementing `Subscriber`, most commonly a closure, and are
//! shared by reference count so that the same observer can later be removed
//! again.

use std::cell::RefCell;
use std::rc::Rc;


/// Something that can receive the values published by a stream or emitter.
///
/// Closures taking a reference to the value implement this trait directly:
///
/// ```
/// # use std::rc::Rc;
/// # use brook::{Stream, SubscriberRef};
/// let stream = Stream::new(0);
/// let printer: SubscriberRef<i32> = Rc::new(|n: &i32| println!("got {}", n));
/// stream.subscribe(printer.clone());
/// stream.push(3);
/// stream.unsubscribe(&printer);
/// ```
pub trait Subscriber<T> {
    /// Handle a single published value.
    fn receive(&self, value: &T);
}

impl<T, F: Fn(&T)> Subscriber<T> for F {
    fn receive(&self, value: &T) { self(value) }
}

/// A shared subscriber.
///
/// Two references denote the same subscriber iff they point to the same
/// allocation.
pub type SubscriberRef<T> = Rc<dyn Subscriber<T>>;


/// Whether two subscriber references denote the same subscriber.
pub(crate) fn same<T: ?Sized, U: ?Sized>(a: &Rc<T>, b: &Rc<U>) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}


/// An ordered list of subscribers, duplicates allowed.
///
/// All methods take `&self` and never hold the inner borrow while calling
/// into a subscriber, so subscribers may modify the list they are notified
/// from.
pub(crate) struct Subscribers<T> {
    list: RefCell<Vec<SubscriberRef<T>>>,
}

impl<T> Subscribers<T> {
    /// Create an empty list.
    pub fn new() -> Subscribers<T> {
        Subscribers { list: RefCell::new(vec![]) }
    }

    /// Append a subscriber. Returns whether the list was empty before.
    pub fn add(&self, subscriber: SubscriberRef<T>) -> bool {
        let mut list = self.list.borrow_mut();
        list.push(subscriber);
        list.len() == 1
    }

    /// Remove the first occurrence of a subscriber. Returns whether this
    /// removed the last one.
    pub fn remove(&self, subscriber: &SubscriberRef<T>) -> bool {
        let (removed, now_empty) = {
            let mut list = self.list.borrow_mut();
            match list.iter().position(|s| same(s, subscriber)) {
                Some(index) => (Some(list.remove(index)), list.is_empty()),
                None => (None, false),
            }
        };
        // dropping a relay may drop whole chains; the list must be free by then
        drop(removed);
        now_empty
    }

    /// Remove all subscribers. Returns whether there were any.
    pub fn clear(&self) -> bool {
        let removed = std::mem::take(&mut *self.list.borrow_mut());
        !removed.is_empty()
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize { self.list.borrow().len() }

    /// Deliver a value to every subscriber in order.
    ///
    /// The list is walked by position and re-read before every delivery.
    /// Subscribers appended while publishing are therefore reached in the same
    /// pass, and removing an earlier entry shifts the next one under the cursor.
    pub fn publish(&self, value: &T) {
        let mut index = 0;
        loop {
            let next = self.list.borrow().get(index).cloned();
            match next {
                Some(subscriber) => subscriber.receive(value),
                None => break,
            }
            index += 1;
        }
    }
}
