//! Errors raised while wiring streams together.

use thiserror::Error;


/// An error building a derived stream.
///
/// Errors only ever come from constructing operators. Pushing, publishing and
/// (un)subscribing cannot fail.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// An operator was given an argument it cannot work with.
    #[error("invalid argument to `{operator}`: {reason}")]
    InvalidArgument {
        /// The operator that rejected the argument.
        operator: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Shorthand for results of operator construction.
pub type Result<T, E = Error> = std::result::Result<T, E>;
