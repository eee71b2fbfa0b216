//! A singly-linked, append-at-the-back, remove-at-the-front list.
//!
//! This is the storage underneath every stream. Every node is allocated with
//! `Box::leak` on append and reclaimed with `Box::from_raw` when it leaves
//! the front, so `head`, `tail` and the `next` links are all plain pointers
//! into memory the list owns.

use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;


/// A single entry of an `OrderedBuffer`.
pub struct Node<T> {
    value: T,
    next: Option<NonNull<Node<T>>>,
}

impl<T> Node<T> {
    /// The value stored in this node.
    pub fn value(&self) -> &T { &self.value }

    /// The next (newer) node, if any.
    pub fn next(&self) -> Option<&Node<T>> {
        // SAFETY: `next` points at a live node owned by the same list, which
        // is borrowed for at least as long as `self`.
        self.next.map(|next| unsafe { &*next.as_ptr() })
    }
}


/// An ordered sequence of values, oldest first.
///
/// ```
/// # use brook::OrderedBuffer;
/// let mut buffer = OrderedBuffer::new();
/// assert_eq!(buffer.append('a'), 1);
/// assert_eq!(buffer.append('b'), 2);
/// assert_eq!(buffer.remove_front(), Some('a'));
/// assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![&'b']);
/// ```
pub struct OrderedBuffer<T> {
    // `None` exactly when `tail` is, and when `length` is zero.
    head: Option<NonNull<Node<T>>>,
    tail: Option<NonNull<Node<T>>>,
    length: usize,
    _owns: PhantomData<Box<Node<T>>>,
}

impl<T> OrderedBuffer<T> {
    /// Create an empty buffer.
    pub fn new() -> OrderedBuffer<T> {
        OrderedBuffer { head: None, tail: None, length: 0, _owns: PhantomData }
    }

    /// Append a value at the back and return the new length.
    pub fn append(&mut self, value: T) -> usize {
        let node = NonNull::from(Box::leak(Box::new(Node { value, next: None })));
        match self.tail {
            // SAFETY: `tail` came from `Box::leak` and is only freed by
            // `remove_front`, which clears it along with the last node.
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.length += 1;
        self.length
    }

    /// Detach the oldest value, if there is one.
    pub fn remove_front(&mut self) -> Option<T> {
        self.head.map(|head| {
            // SAFETY: `head` came from `Box::leak` and is unlinked right here,
            // so it is reclaimed exactly once.
            let node = unsafe { Box::from_raw(head.as_ptr()) };
            self.head = node.next;
            if self.head.is_none() {
                self.tail = None;
            }
            self.length -= 1;
            node.value
        })
    }

    fn first(&self) -> Option<&Node<T>> {
        // SAFETY: see `Node::next`.
        self.head.map(|head| unsafe { &*head.as_ptr() })
    }

    /// Visit every node from oldest to newest.
    pub fn for_each<F: FnMut(&Node<T>)>(&self, mut visit: F) {
        let mut node = self.first();
        while let Some(current) = node {
            visit(current);
            node = current.next();
        }
    }

    /// Iterate over the buffered values from oldest to newest.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { node: self.first(), remaining: self.length }
    }

    /// The oldest value.
    pub fn front(&self) -> Option<&T> {
        self.first().map(Node::value)
    }

    /// The newest value.
    pub fn back(&self) -> Option<&T> {
        // SAFETY: see `Node::next`.
        self.tail.map(|tail| unsafe { &(*tail.as_ptr()).value })
    }

    /// Number of buffered values.
    pub fn len(&self) -> usize { self.length }

    /// Whether the buffer holds no values.
    pub fn is_empty(&self) -> bool { self.length == 0 }
}

impl<T> Drop for OrderedBuffer<T> {
    fn drop(&mut self) {
        while self.remove_front().is_some() {}
    }
}

impl<T> Default for OrderedBuffer<T> {
    fn default() -> OrderedBuffer<T> { OrderedBuffer::new() }
}

impl<T: fmt::Debug> fmt::Debug for OrderedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for OrderedBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T> FromIterator<T> for OrderedBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> OrderedBuffer<T> {
        let mut buffer = OrderedBuffer::new();
        buffer.extend(iter);
        buffer
    }
}

impl<'a, T> IntoIterator for &'a OrderedBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Iter<'a, T> { self.iter() }
}


/// Borrowing iterator over an `OrderedBuffer`.
pub struct Iter<'a, T> {
    node: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.node.map(|node| {
            self.node = node.next();
            self.remaining -= 1;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
