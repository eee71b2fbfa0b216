//! Buffered streams of values

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, trace};

use crate::capacity::Capacity;
use crate::error::{Error, Result};
use crate::list::OrderedBuffer;
use crate::subscriber::{same, Subscriber, SubscriberRef, Subscribers};

use self::operator::{Each, Filter, Map, Operator, Passthrough, Upstream};
use self::reduce::Reduce;


mod operator;
mod reduce;


/// Code run when a stream gains its first subscriber (`open`) or loses its
/// last one (`close`).
pub(crate) trait Lifecycle<T> {
    fn open(&self, stream: &Stream<T>);
    fn close(&self, stream: &Stream<T>);
}

/// User-supplied lifecycle hooks of a root stream.
struct Hooks<O, C> {
    on_open: O,
    on_close: C,
}

impl<T, O, C> Lifecycle<T> for Hooks<O, C>
    where O: Fn(&Stream<T>),
          C: Fn(&Stream<T>),
{
    fn open(&self, stream: &Stream<T>) { (self.on_open)(stream) }
    fn close(&self, stream: &Stream<T>) { (self.on_close)(stream) }
}


struct Inner<T> {
    buffer: RefCell<OrderedBuffer<T>>,
    capacity: Capacity,
    subscribers: Subscribers<T>,
    lifecycle: Option<Box<dyn Lifecycle<T>>>,
}

impl<T: Clone> Inner<T> {
    /// Append, evict the oldest value if over capacity, then publish.
    fn push(&self, value: T) {
        {
            let mut buffer = self.buffer.borrow_mut();
            let len = buffer.append(value.clone());
            if self.capacity.exceeded_by(len) {
                buffer.remove_front();
                trace!("evicted oldest value (capacity {})", self.capacity);
            }
        }
        self.subscribers.publish(&value);
    }
}

impl<T: Clone> Subscriber<T> for Inner<T> {
    fn receive(&self, value: &T) { self.push(value.clone()) }
}


/// A lazy, buffered stream of values.
///
/// A stream remembers up to `capacity` of the most recent values pushed into
/// it and hands every new value to its subscribers, in subscription order,
/// before `push` returns.
///
/// Streams derived through `map`, `filter`, `buffer`, `reduce` and `merge` are
/// lazy: they only attach to their origin once they have a subscriber of their
/// own, and detach again when the last one leaves. On attaching they first
/// replay whatever the origin currently buffers. `for_each` is the exception;
/// it attaches immediately and thereby switches on everything upstream of it.
///
/// ```
/// # use std::cell::RefCell;
/// # use std::rc::Rc;
/// # use brook::Stream;
/// let source = Stream::unbounded();
/// source.push(1);
///
/// let seen = Rc::new(RefCell::new(vec![]));
/// let _sink = source
///     .map(|n| n * 10)
///     .filter(|n| *n > 10)
///     .for_each({
///         let seen = seen.clone();
///         move |n| seen.borrow_mut().push(*n)
///     });
///
/// source.push(2);
/// source.push(3);
/// assert_eq!(*seen.borrow(), vec![20, 30]);
/// ```
///
/// A `Stream` is a handle: clones refer to the same stream. Ownership follows
/// subscriptions. An active derived stream is kept alive by its origins, so a
/// running chain needs no handle to its end and stops when its root is
/// dropped. An inactive one keeps its origins alive instead, so chains can be
/// built from temporaries and switched on later.
pub struct Stream<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Stream<T> {
        Stream { inner: self.inner.clone() }
    }
}


/// A non-owning reference to a stream.
pub(crate) struct WeakStream<T> {
    inner: Weak<Inner<T>>,
}

impl<T> WeakStream<T> {
    pub fn upgrade(&self) -> Option<Stream<T>> {
        self.inner.upgrade().map(|inner| Stream { inner })
    }
}


impl<T> Stream<T> {
    fn from_parts(capacity: Capacity, lifecycle: Option<Box<dyn Lifecycle<T>>>) -> Stream<T> {
        Stream {
            inner: Rc::new(Inner {
                buffer: RefCell::new(OrderedBuffer::new()),
                capacity,
                subscribers: Subscribers::new(),
                lifecycle,
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakStream<T> {
        WeakStream { inner: Rc::downgrade(&self.inner) }
    }

    /// Register a subscriber.
    ///
    /// The same subscriber may be registered several times and then receives
    /// every value once per registration. The first subscriber activates the
    /// stream.
    pub fn subscribe(&self, subscriber: SubscriberRef<T>) {
        if self.inner.subscribers.add(subscriber) {
            trace!("stream opened");
            if let Some(lifecycle) = &self.inner.lifecycle {
                lifecycle.open(self);
            }
        }
    }

    /// Remove one registration of a subscriber.
    ///
    /// Removing the last subscriber deactivates the stream. Removing a
    /// subscriber that is not registered does nothing.
    pub fn unsubscribe(&self, subscriber: &SubscriberRef<T>) {
        if self.inner.subscribers.remove(subscriber) {
            self.close();
        }
    }

    /// Remove every subscriber, deactivating the stream if it had any.
    pub fn unsubscribe_all(&self) {
        if self.inner.subscribers.clear() {
            self.close();
        }
    }

    fn close(&self) {
        trace!("stream closed");
        if let Some(lifecycle) = &self.inner.lifecycle {
            lifecycle.close(self);
        }
    }

    /// Deliver a value to the current subscribers without buffering it.
    ///
    /// Subscribers registered while the value is being delivered still receive
    /// it; see the crate documentation on reentrancy.
    pub fn publish(&self, value: &T) {
        self.inner.subscribers.publish(value);
    }

    /// The maximum number of values this stream retains.
    pub fn capacity(&self) -> Capacity { self.inner.capacity }

    /// Number of values currently buffered.
    pub fn len(&self) -> usize { self.inner.buffer.borrow().len() }

    /// Whether no values are buffered.
    pub fn is_empty(&self) -> bool { self.inner.buffer.borrow().is_empty() }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize { self.inner.subscribers.len() }

    /// Whether the stream has subscribers, i.e. is active.
    pub fn is_hot(&self) -> bool { self.subscriber_count() > 0 }

    /// Visit the buffered values from oldest to newest.
    ///
    /// # Panics
    ///
    /// The buffer stays borrowed during the visit, so pushing into this same
    /// stream from `visit` panics. Use `values` to work on a copy instead.
    pub fn iterate<F: FnMut(&T)>(&self, visit: F) {
        self.inner.buffer.borrow().iter().for_each(visit);
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Create a stream retaining up to `capacity` values.
    ///
    /// The capacity is coerced, see `Capacity`. A capacity of zero still
    /// delivers every value to subscribers but buffers none.
    pub fn new<C: Into<Capacity>>(capacity: C) -> Stream<T> {
        Stream::from_parts(capacity.into(), None)
    }

    /// Create a stream retaining all values.
    pub fn unbounded() -> Stream<T> {
        Stream::new(Capacity::Unbounded)
    }

    /// Create a stream with activation hooks.
    ///
    /// `on_open` runs whenever the stream gains its first subscriber and
    /// `on_close` whenever it loses its last one. This is how a producer can
    /// find out whether anything is listening.
    ///
    /// ```
    /// # use std::cell::Cell;
    /// # use std::rc::Rc;
    /// # use brook::Stream;
    /// let listening = Rc::new(Cell::new(false));
    /// let ticks: Stream<u32> = Stream::with_lifecycle(
    ///     1,
    ///     { let l = listening.clone(); move |_: &Stream<u32>| l.set(true) },
    ///     { let l = listening.clone(); move |_: &Stream<u32>| l.set(false) },
    /// );
    /// let doubled = ticks.map(|t| t * 2);
    /// assert!(!listening.get());
    ///
    /// let printer = doubled.subscribe_fn(|t| println!("{}", t));
    /// assert!(listening.get());
    ///
    /// doubled.unsubscribe(&printer);
    /// assert!(!listening.get());
    /// ```
    pub fn with_lifecycle<C, O, F>(capacity: C, on_open: O, on_close: F) -> Stream<T>
        where C: Into<Capacity>,
              O: Fn(&Stream<T>) + 'static,
              F: Fn(&Stream<T>) + 'static,
    {
        Stream::from_parts(capacity.into(), Some(Box::new(Hooks { on_open, on_close })))
    }

    /// Push a value: buffer it, evict the oldest value if the buffer is over
    /// capacity, and publish it to every subscriber.
    pub fn push(&self, value: T) {
        self.inner.push(value);
    }

    /// Push several values in order.
    ///
    /// An empty batch still runs one full push of `T::default()`, so that an
    /// argument-less trigger reaches subscribers as well.
    ///
    /// ```
    /// # use brook::Stream;
    /// let stream = Stream::<Option<u8>>::new(4);
    /// stream.push_all(vec![Some(1), Some(2)]);
    /// stream.push_all(vec![]);
    /// assert_eq!(stream.values(), vec![Some(1), Some(2), None]);
    /// ```
    pub fn push_all<I: IntoIterator<Item = T>>(&self, values: I)
        where T: Default,
    {
        let mut pushed = false;
        for value in values {
            self.push(value);
            pushed = true;
        }
        if !pushed {
            self.push(T::default());
        }
    }

    /// Push every value of an iterator, in order.
    pub fn feed<I: IntoIterator<Item = T>>(&self, values: I) {
        for value in values {
            self.push(value);
        }
    }

    /// Subscribe a closure and return the handle needed to unsubscribe it.
    pub fn subscribe_fn<F: Fn(&T) + 'static>(&self, f: F) -> SubscriberRef<T> {
        let subscriber: SubscriberRef<T> = Rc::new(f);
        self.subscribe(subscriber.clone());
        subscriber
    }

    /// This stream as a subscriber of another one: every value it receives is
    /// pushed into this stream.
    pub fn as_subscriber(&self) -> SubscriberRef<T> {
        self.inner.clone()
    }

    /// A copy of the buffered values, oldest first.
    pub fn values(&self) -> Vec<T> {
        self.inner.buffer.borrow().iter().cloned().collect()
    }

    /// The oldest buffered value.
    pub fn front(&self) -> Option<T> {
        self.inner.buffer.borrow().front().cloned()
    }

    /// The newest buffered value.
    pub fn back(&self) -> Option<T> {
        self.inner.buffer.borrow().back().cloned()
    }

    fn derive<O>(&self, capacity: Capacity, operator: O) -> Stream<O::Output>
        where O: Operator<T> + 'static,
    {
        debug!("deriving stream with capacity {}", capacity);
        let upstream = Upstream::lazy(vec![self.clone()], operator);
        Stream::from_parts(capacity, Some(Box::new(upstream)))
    }

    /// Re-buffer this stream with a different capacity.
    ///
    /// ```
    /// # use brook::Stream;
    /// let source = Stream::<i32>::unbounded();
    /// let recent = source.buffer(2);
    /// let _sink = recent.for_each(|_| ());
    /// source.feed(vec![1, 2, 3]);
    /// assert_eq!(recent.values(), vec![2, 3]);
    /// ```
    #[must_use = "derived streams do nothing until subscribed"]
    pub fn buffer<C: Into<Capacity>>(&self, capacity: C) -> Stream<T> {
        self.derive(capacity.into(), Passthrough)
    }

    /// Map the stream to another stream using a function.
    ///
    /// ```
    /// # use brook::Stream;
    /// let source = Stream::<i32>::unbounded();
    /// let doubled = source.map(|n| n * 2);
    /// let _sink = doubled.for_each(|_| ());
    /// source.feed(vec![1, 2, 3]);
    /// assert_eq!(doubled.values(), vec![2, 4, 6]);
    /// ```
    #[must_use = "derived streams do nothing until subscribed"]
    pub fn map<B, F>(&self, f: F) -> Stream<B>
        where B: Clone + 'static,
              F: Fn(&T) -> B + 'static,
    {
        self.derive(self.capacity(), Map(f))
    }

    /// Keep only the values satisfying a predicate.
    #[must_use = "derived streams do nothing until subscribed"]
    pub fn filter<F>(&self, f: F) -> Stream<T>
        where F: Fn(&T) -> bool + 'static,
    {
        self.derive(self.capacity(), Filter(f))
    }

    /// Run a side effect for every value and pass the values on unchanged.
    ///
    /// Unlike the other operators this attaches right away: it first runs
    /// over the values buffered so far, then over every new one. It keeps
    /// running for as long as this stream is alive, whether or not the
    /// returned stream is kept.
    pub fn for_each<F>(&self, f: F) -> Stream<T>
        where F: Fn(&T) + 'static,
    {
        let stream: Stream<T> = Stream::from_parts(
            self.capacity(),
            Some(Box::new(Upstream::eager(vec![self.clone()], Each(f)))),
        );
        if let Some(lifecycle) = &stream.inner.lifecycle {
            lifecycle.open(&stream);
        }
        stream
    }

    /// Aggregate the values of this stream.
    ///
    /// Every incoming value pushes the current aggregate. Without an initial
    /// value the first value seeds the aggregate. The result retains nothing
    /// itself.
    ///
    /// If this stream is unbounded, the aggregate is a running fold. If it is
    /// bounded, the aggregate is recomputed from the buffered values every
    /// time, so it always covers exactly the values still in the buffer:
    ///
    /// ```
    /// # use std::cell::RefCell;
    /// # use std::rc::Rc;
    /// # use brook::Stream;
    /// let source = Stream::<i32>::new(3);
    /// let sums = Rc::new(RefCell::new(vec![]));
    /// let _sink = source.reduce(|a, b| a + b, None).for_each({
    ///     let sums = sums.clone();
    ///     move |s| sums.borrow_mut().push(*s)
    /// });
    /// source.feed(vec![1, 2, 3, 4]);
    /// assert_eq!(*sums.borrow(), vec![1, 3, 6, 9]);
    /// ```
    #[must_use = "derived streams do nothing until subscribed"]
    pub fn reduce<F>(&self, f: F, initial: Option<T>) -> Stream<T>
        where F: Fn(T, &T) -> T + 'static,
    {
        self.derive(Capacity::default(), Reduce::new(self, f, initial))
    }

    /// Merge with another stream.
    ///
    /// The merged stream fires the values of both streams in the order they
    /// arrive and can buffer as many values as both together.
    #[must_use = "derived streams do nothing until subscribed"]
    pub fn merge(&self, other: &Stream<T>) -> Stream<T> {
        let upstream = Upstream::lazy(vec![self.clone(), other.clone()], Passthrough);
        Stream::from_parts(self.capacity() + other.capacity(), Some(Box::new(upstream)))
    }

    /// Push everything this stream buffers and publishes into `target`.
    ///
    /// The buffered values are replayed into `target` first. Returns `target`.
    /// This stream keeps `target` alive until it is unpiped. Piping into a
    /// stream derived from this one, as in `s.pipe(&s.buffer(3))`, therefore
    /// forms a reference cycle that is leaked unless `unpipe` breaks it.
    ///
    /// # Errors
    ///
    /// A stream cannot be piped into itself.
    pub fn pipe(&self, target: &Stream<T>) -> Result<Stream<T>> {
        if same(&self.inner, &target.inner) {
            debug!("rejected piping a stream into itself");
            return Err(Error::InvalidArgument {
                operator: "pipe",
                reason: "a stream cannot be piped into itself",
            });
        }
        for value in self.values() {
            target.push(value);
        }
        self.subscribe(target.as_subscriber());
        Ok(target.clone())
    }

    /// Stop piping into `target`. Returns `target`.
    pub fn unpipe(&self, target: &Stream<T>) -> Stream<T> {
        self.unsubscribe(&target.as_subscriber());
        target.clone()
    }
}

impl<T: Clone + 'static> Default for Stream<T> {
    fn default() -> Stream<T> { Stream::new(Capacity::default()) }
}

impl<T: fmt::Debug> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Stream");
        out.field("capacity", &self.inner.capacity);
        match self.inner.buffer.try_borrow() {
            Ok(buffer) => out.field("buffer", &*buffer),
            Err(_) => out.field("buffer", &"<borrowed>"),
        };
        out.field("subscribers", &self.inner.subscribers.len()).finish()
    }
}
