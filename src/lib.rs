//! Lazy, buffered push streams
//!
//! *Brook* provides streams of values that remember a bounded number of their
//! most recent values and notify subscribers synchronously whenever a new one
//! arrives. Streams can be derived from other streams with the usual
//! operators, and a chain of operators runs per value: one `push` at the root
//! drives that value through every stage before the next value starts.
//!
//!
//! # Streams
//!
//! A `Stream` is created with a capacity, the number of values it keeps in
//! its buffer. Values beyond that evict the oldest ones. A capacity of zero is
//! perfectly useful: such a stream buffers nothing but still delivers every
//! value to its subscribers.
//!
//! Derived streams are lazy. `map`, `filter`, `buffer`, `reduce` and `merge`
//! do nothing until the derived stream itself gets a subscriber. At that
//! point it subscribes to its origin, replays the values the origin has
//! buffered so far and then follows along. When its last subscriber leaves it
//! lets go of its origin again. `for_each` is the terminal operator that
//! switches a chain on without further ado.
//!
//!
//! # Example
//!
//! ```
//! # // NOTE: If you change this example, please update the README.md
//! # // accordingly, so that they remain in sync!
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use brook::Stream;
//!
//! // Keep the last three temperature readings
//! let readings = Stream::new(3);
//! readings.feed(vec![19.5, 20.0]);
//!
//! // Nothing happens until the chain is switched on...
//! let warm = readings.filter(|t| *t >= 20.0).map(|t| format!("{:.1}°C", t));
//! assert!(!readings.is_hot());
//!
//! // ...which replays the buffered readings first
//! let log = Rc::new(RefCell::new(vec![]));
//! let _sink = warm.for_each({
//!     let log = log.clone();
//!     move |t| log.borrow_mut().push(t.clone())
//! });
//! assert_eq!(*log.borrow(), vec!["20.0°C"]);
//!
//! readings.push(21.5);
//! readings.push(18.0);
//! assert_eq!(*log.borrow(), vec!["20.0°C", "21.5°C"]);
//! assert_eq!(readings.values(), vec![20.0, 21.5, 18.0]);
//! ```
//!
//! # Ownership
//!
//! Streams are reference-counted handles and are not thread-safe. Ownership
//! follows subscriptions: an origin keeps the active streams derived from it
//! alive, much like a garbage collector would, while an inactive derived
//! stream keeps its origins alive so that it can attach to them later. A
//! running chain therefore needs no handle to its end; it stops when its root
//! is dropped or unsubscribed from. A stream piped into one derived from it
//! forms a reference cycle until it is unpiped.
//!
//!
//! # Reentrancy
//!
//! Subscribers may push into streams, subscribe and unsubscribe while a value
//! is being delivered. Delivery walks the subscriber list by position: a
//! subscriber added during delivery still receives the current value, and a
//! subscriber removing itself causes the one right after it to be skipped for
//! that value.

#![warn(missing_docs)]

pub use crate::capacity::Capacity;
pub use crate::emitter::Emitter;
pub use crate::error::{Error, Result};
pub use crate::list::{Iter, Node, OrderedBuffer};
pub use crate::stream::Stream;
pub use crate::subscriber::{Subscriber, SubscriberRef};

mod capacity;
mod emitter;
mod error;
mod list;
mod stream;
mod subscriber;
#[cfg(test)]
mod testing;
