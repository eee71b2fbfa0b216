//! Plain event emitters.

use std::fmt;
use std::rc::Rc;

use crate::subscriber::{SubscriberRef, Subscribers};


/// A list of subscribers that events can be emitted to.
///
/// Unlike a `Stream` an emitter neither buffers events nor knows when it
/// gains or loses subscribers. It merely forwards.
///
/// ```
/// # use std::cell::Cell;
/// # use std::rc::Rc;
/// # use brook::Emitter;
/// let clicks = Emitter::new();
/// let count = Rc::new(Cell::new(0));
/// let counter = clicks.subscribe_fn({
///     let count = count.clone();
///     move |_: &(i32, i32)| count.set(count.get() + 1)
/// });
///
/// clicks.emit(&(10, 20));
/// clicks.unsubscribe(&counter);
/// clicks.emit(&(30, 40));
/// assert_eq!(count.get(), 1);
/// ```
pub struct Emitter<E> {
    subscribers: Subscribers<E>,
}

impl<E> Emitter<E> {
    /// Create an emitter without subscribers.
    pub fn new() -> Emitter<E> {
        Emitter { subscribers: Subscribers::new() }
    }

    /// Register a subscriber. Duplicates are allowed.
    pub fn subscribe(&self, subscriber: SubscriberRef<E>) {
        self.subscribers.add(subscriber);
    }

    /// Remove the first registration of a subscriber, if any.
    pub fn unsubscribe(&self, subscriber: &SubscriberRef<E>) {
        self.subscribers.remove(subscriber);
    }

    /// Remove every subscriber.
    pub fn unsubscribe_all(&self) {
        self.subscribers.clear();
    }

    /// Deliver an event to every subscriber in registration order.
    pub fn emit(&self, event: &E) {
        self.subscribers.publish(event);
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize { self.subscribers.len() }

    /// Whether there are no subscribers.
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<E: 'static> Emitter<E> {
    /// Subscribe a closure and return the handle needed to unsubscribe it.
    pub fn subscribe_fn<F: Fn(&E) + 'static>(&self, f: F) -> SubscriberRef<E> {
        let subscriber: SubscriberRef<E> = Rc::new(f);
        self.subscribe(subscriber.clone());
        subscriber
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Emitter<E> { Emitter::new() }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter").field("subscribers", &self.len()).finish()
    }
}


#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;
    use super::*;

    #[test]
    fn emits_in_registration_order() {
        let emitter = Emitter::new();
        let log = Rc::new(RefCell::new(vec![]));
        for tag in vec!["x", "y"] {
            let log = log.clone();
            emitter.subscribe_fn(move |e: &u8| log.borrow_mut().push((tag, *e)));
        }
        emitter.emit(&1);
        assert_eq!(*log.borrow(), vec![("x", 1), ("y", 1)]);
    }

    #[test]
    fn emit_without_subscribers() {
        let emitter = Emitter::<()>::default();
        emitter.emit(&());
        assert!(emitter.is_empty());
    }

    #[test]
    fn unsubscribe_one_and_all() {
        let emitter = Emitter::new();
        let log = Rc::new(RefCell::new(vec![]));
        let a = emitter.subscribe_fn({
            let log = log.clone();
            move |e: &i32| log.borrow_mut().push(*e)
        });
        emitter.subscribe(a.clone());
        emitter.unsubscribe(&a);
        emitter.emit(&1);
        assert_eq!(*log.borrow(), vec![1]);
        emitter.unsubscribe_all();
        emitter.emit(&2);
        assert_eq!(*log.borrow(), vec![1]);
        assert_eq!(emitter.len(), 0);
    }

    #[test]
    fn debug_shows_subscriber_count() {
        let emitter = Emitter::<i32>::new();
        emitter.subscribe_fn(|_| ());
        assert_eq!(format!("{:?}", emitter), "Emitter { subscribers: 1 }");
    }
}
