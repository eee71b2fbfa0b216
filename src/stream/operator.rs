//! Per-item strategies of derived streams and the plumbing that connects a
//! derived stream to its origins.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use log::trace;

use super::{Lifecycle, Stream, WeakStream};
use crate::subscriber::{Subscriber, SubscriberRef};


/// How a derived stream turns one incoming value into zero or more outgoing
/// values.
pub(crate) trait Operator<A> {
    /// Type of the values pushed downstream.
    type Output: Clone + 'static;

    /// Handle one value from an origin, passing results to `emit`.
    fn step(&self, input: &A, emit: &mut dyn FnMut(Self::Output));

    /// Forget accumulated state. Called whenever the stream is (re)attached.
    fn reset(&self) {}
}


/// Forward every value unchanged.
pub(crate) struct Passthrough;

impl<A: Clone + 'static> Operator<A> for Passthrough {
    type Output = A;

    fn step(&self, input: &A, emit: &mut dyn FnMut(A)) {
        emit(input.clone());
    }
}


/// Push the image of every value.
pub(crate) struct Map<F>(pub F);

impl<A, B, F> Operator<A> for Map<F>
    where B: Clone + 'static,
          F: Fn(&A) -> B,
{
    type Output = B;

    fn step(&self, input: &A, emit: &mut dyn FnMut(B)) {
        emit((self.0)(input));
    }
}


/// Push only the values satisfying a predicate.
pub(crate) struct Filter<F>(pub F);

impl<A, F> Operator<A> for Filter<F>
    where A: Clone + 'static,
          F: Fn(&A) -> bool,
{
    type Output = A;

    fn step(&self, input: &A, emit: &mut dyn FnMut(A)) {
        if (self.0)(input) {
            emit(input.clone());
        }
    }
}


/// Run a side effect, then forward the value unchanged.
pub(crate) struct Each<F>(pub F);

impl<A, F> Operator<A> for Each<F>
    where A: Clone + 'static,
          F: Fn(&A),
{
    type Output = A;

    fn step(&self, input: &A, emit: &mut dyn FnMut(A)) {
        (self.0)(input);
        emit(input.clone());
    }
}


/// The subscriber a derived stream registers with its origins.
///
/// It holds its target strongly, so an attached derived stream lives as long
/// as one of its origins does.
struct Relay<A, O: Operator<A>> {
    operator: Rc<O>,
    target: Stream<O::Output>,
    _input: PhantomData<fn(&A)>,
}

impl<A, O: Operator<A>> Subscriber<A> for Relay<A, O> {
    fn receive(&self, value: &A) {
        let target = &self.target;
        self.operator.step(value, &mut |output| target.push(output));
    }
}


/// Reference from a derived stream to one of its origins.
enum Link<A> {
    /// Detached: the derived stream keeps the origin alive.
    Owned(Stream<A>),
    /// Attached: the origin keeps the derived stream alive through its relay.
    Attached(WeakStream<A>),
}

impl<A> Link<A> {
    fn get(&self) -> Option<Stream<A>> {
        match self {
            Link::Owned(origin) => Some(origin.clone()),
            Link::Attached(origin) => origin.upgrade(),
        }
    }
}


/// Connection of a derived stream to its origin(s).
///
/// Lazy upstreams attach when the derived stream gains its first subscriber
/// and detach when it loses its last. Eager ones attach once, right after
/// construction, and stay attached for as long as an origin is alive.
///
/// Ownership flips on attach: a detached stream owns its origins, an attached
/// one is owned by them. There is never a strong reference in both
/// directions.
pub(crate) struct Upstream<A, O> {
    origins: RefCell<Vec<Link<A>>>,
    operator: Rc<O>,
    relay: RefCell<Option<Weak<dyn Subscriber<A>>>>,
    eager: bool,
}

impl<A, O> Upstream<A, O>
    where A: Clone + 'static,
          O: Operator<A> + 'static,
{
    pub fn lazy(origins: Vec<Stream<A>>, operator: O) -> Upstream<A, O> {
        Upstream::with_mode(origins, operator, false)
    }

    pub fn eager(origins: Vec<Stream<A>>, operator: O) -> Upstream<A, O> {
        Upstream::with_mode(origins, operator, true)
    }

    fn with_mode(origins: Vec<Stream<A>>, operator: O, eager: bool) -> Upstream<A, O> {
        Upstream {
            origins: RefCell::new(origins.into_iter().map(Link::Owned).collect()),
            operator: Rc::new(operator),
            relay: RefCell::new(None),
            eager,
        }
    }

    /// Replay what the origins currently buffer, then subscribe to them.
    fn attach(&self, target: &Stream<O::Output>) {
        if self.relay.borrow().is_some() {
            return;
        }
        self.operator.reset();
        let relay: SubscriberRef<A> = Rc::new(Relay {
            operator: self.operator.clone(),
            target: target.clone(),
            _input: PhantomData,
        });
        *self.relay.borrow_mut() = Some(Rc::downgrade(&relay));
        let origins = self.live_origins();
        trace!("attaching to {} origin(s)", origins.len());
        for origin in &origins {
            for value in origin.values() {
                relay.receive(&value);
            }
        }
        // detached again while replaying
        if self.relay.borrow().is_none() {
            return;
        }
        for origin in &origins {
            origin.subscribe(relay.clone());
        }
        *self.origins.borrow_mut() =
            origins.iter().map(|origin| Link::Attached(origin.downgrade())).collect();
    }
}

impl<A, O> Upstream<A, O> {
    fn live_origins(&self) -> Vec<Stream<A>> {
        self.origins.borrow().iter().filter_map(Link::get).collect()
    }

    /// Unsubscribe from the origins and take ownership of them again.
    fn detach(&self) {
        let relay = match self.relay.borrow_mut().take() {
            Some(relay) => relay,
            None => return,
        };
        let origins = self.live_origins();
        *self.origins.borrow_mut() = origins.iter().cloned().map(Link::Owned).collect();
        if let Some(relay) = relay.upgrade() {
            trace!("detaching from {} origin(s)", origins.len());
            for origin in &origins {
                origin.unsubscribe(&relay);
            }
        }
    }
}

impl<A, O> Lifecycle<O::Output> for Upstream<A, O>
    where A: Clone + 'static,
          O: Operator<A> + 'static,
{
    fn open(&self, stream: &Stream<O::Output>) {
        self.attach(stream);
    }

    fn close(&self, _: &Stream<O::Output>) {
        if !self.eager {
            self.detach();
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    fn run<A, O: Operator<A>>(operator: &O, inputs: &[A]) -> Vec<O::Output> {
        let mut out = vec![];
        for input in inputs {
            operator.step(input, &mut |o| out.push(o));
        }
        out
    }

    #[test]
    fn passthrough() {
        assert_eq!(run(&Passthrough, &[1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn map() {
        assert_eq!(run(&Map(|x: &i32| x.to_string()), &[1, 2]), vec!["1", "2"]);
    }

    #[test]
    fn filter() {
        assert_eq!(run(&Filter(|x: &i32| *x > 2), &[1, 2, 3, 4]), vec![3, 4]);
    }

    #[test]
    fn each_runs_side_effect_and_forwards() {
        let seen = RefCell::new(vec![]);
        let each = Each(|x: &i32| seen.borrow_mut().push(*x));
        assert_eq!(run(&each, &[5, 6]), vec![5, 6]);
        assert_eq!(*seen.borrow(), vec![5, 6]);
    }
}
