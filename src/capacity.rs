//! How many values a stream retains.

use std::fmt;
use std::ops::Add;


/// The maximum number of values a stream keeps buffered.
///
/// Capacities are coerced from loosely typed input rather than rejected:
/// anything that is not a non-negative number becomes zero, fractions are
/// floored, and infinity (or anything too large to count) is `Unbounded`.
///
/// ```
/// # use brook::Capacity;
/// assert_eq!(Capacity::from(3.7), Capacity::Bounded(3));
/// assert_eq!(Capacity::from(-5), Capacity::Bounded(0));
/// assert_eq!(Capacity::from(f64::NAN), Capacity::Bounded(0));
/// assert_eq!(Capacity::from(f64::INFINITY), Capacity::Unbounded);
/// assert_eq!(Capacity::coerce("12"), Capacity::Bounded(12));
/// assert_eq!(Capacity::coerce("lots"), Capacity::Bounded(0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capacity {
    /// Retain at most this many values.
    Bounded(usize),
    /// Retain everything.
    Unbounded,
}

impl Capacity {
    /// Coerce a textual setting, e.g. from a configuration file.
    pub fn coerce(input: &str) -> Capacity {
        let input = input.trim();
        match input.to_ascii_lowercase().as_str() {
            "infinity" | "+infinity" | "inf" | "+inf" => Capacity::Unbounded,
            _ => input.parse::<f64>().map(Capacity::from).unwrap_or_default(),
        }
    }

    /// Whether a buffer of `len` values is over this capacity.
    pub fn exceeded_by(self, len: usize) -> bool {
        match self {
            Capacity::Bounded(max) => len > max,
            Capacity::Unbounded => false,
        }
    }

    /// Whether this capacity retains everything.
    pub fn is_unbounded(self) -> bool { self == Capacity::Unbounded }

    /// The numeric limit, if there is one.
    pub fn limit(self) -> Option<usize> {
        match self {
            Capacity::Bounded(max) => Some(max),
            Capacity::Unbounded => None,
        }
    }
}

impl Default for Capacity {
    fn default() -> Capacity { Capacity::Bounded(0) }
}

impl From<f64> for Capacity {
    fn from(n: f64) -> Capacity {
        if n.is_nan() || n <= 0.0 {
            Capacity::Bounded(0)
        } else if n >= usize::MAX as f64 {
            Capacity::Unbounded
        } else {
            Capacity::Bounded(n.floor() as usize)
        }
    }
}

impl From<usize> for Capacity {
    fn from(n: usize) -> Capacity {
        if n == usize::MAX { Capacity::Unbounded } else { Capacity::Bounded(n) }
    }
}

impl From<u32> for Capacity {
    fn from(n: u32) -> Capacity { Capacity::from(n as usize) }
}

impl From<i64> for Capacity {
    fn from(n: i64) -> Capacity {
        if n <= 0 { Capacity::Bounded(0) } else { Capacity::from(n as u64 as usize) }
    }
}

impl From<i32> for Capacity {
    fn from(n: i32) -> Capacity { Capacity::from(n as i64) }
}

impl<C: Into<Capacity>> From<Option<C>> for Capacity {
    fn from(n: Option<C>) -> Capacity {
        n.map_or_else(Capacity::default, Into::into)
    }
}

impl Add for Capacity {
    type Output = Capacity;

    fn add(self, other: Capacity) -> Capacity {
        match (self, other) {
            (Capacity::Bounded(a), Capacity::Bounded(b)) => Capacity::from(a.saturating_add(b)),
            _ => Capacity::Unbounded,
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Capacity::Bounded(max) => write!(f, "{}", max),
            Capacity::Unbounded => f.write_str("∞"),
        }
    }
}


#[cfg(test)]
mod test {
    use quickcheck::quickcheck;
    use super::*;

    #[test]
    fn default_retains_nothing() {
        assert_eq!(Capacity::default(), Capacity::Bounded(0));
        assert_eq!(Capacity::from(None::<usize>), Capacity::Bounded(0));
        assert_eq!(Capacity::from(Some(4)), Capacity::Bounded(4));
    }

    #[test]
    fn floors_fractions() {
        assert_eq!(Capacity::from(2.99), Capacity::Bounded(2));
        assert_eq!(Capacity::from(0.5), Capacity::Bounded(0));
    }

    #[test]
    fn clamps_negatives() {
        assert_eq!(Capacity::from(-0.5), Capacity::Bounded(0));
        assert_eq!(Capacity::from(f64::NEG_INFINITY), Capacity::Bounded(0));
        assert_eq!(Capacity::from(i64::MIN), Capacity::Bounded(0));
    }

    #[test]
    fn huge_values_are_unbounded() {
        assert_eq!(Capacity::from(1e300), Capacity::Unbounded);
        assert_eq!(Capacity::from(usize::MAX), Capacity::Unbounded);
    }

    #[test]
    fn coerce_text() {
        assert_eq!(Capacity::coerce(" 7 "), Capacity::Bounded(7));
        assert_eq!(Capacity::coerce("7.9"), Capacity::Bounded(7));
        assert_eq!(Capacity::coerce("Infinity"), Capacity::Unbounded);
        assert_eq!(Capacity::coerce(""), Capacity::Bounded(0));
        assert_eq!(Capacity::coerce("null"), Capacity::Bounded(0));
        assert_eq!(Capacity::coerce("-3"), Capacity::Bounded(0));
    }

    #[test]
    fn addition_saturates() {
        assert_eq!(Capacity::Bounded(2) + Capacity::Bounded(3), Capacity::Bounded(5));
        assert_eq!(Capacity::Bounded(2) + Capacity::Unbounded, Capacity::Unbounded);
        assert_eq!(Capacity::Bounded(usize::MAX - 1) + Capacity::Bounded(5), Capacity::Unbounded);
    }

    #[test]
    fn exceeded_by() {
        assert!(Capacity::Bounded(0).exceeded_by(1));
        assert!(!Capacity::Bounded(2).exceeded_by(2));
        assert!(!Capacity::Unbounded.exceeded_by(usize::MAX));
    }

    #[test]
    fn display() {
        assert_eq!(Capacity::Bounded(3).to_string(), "3");
        assert_eq!(Capacity::Unbounded.to_string(), "∞");
    }

    #[test]
    fn finite_input_never_goes_negative() {
        fn check(n: i64) -> bool {
            match Capacity::from(n) {
                Capacity::Bounded(max) => (n <= 0 && max == 0) || max as i64 == n,
                Capacity::Unbounded => false,
            }
        }
        quickcheck(check as fn(i64) -> bool);
    }
}
