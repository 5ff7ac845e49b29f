//! Reserved sentinel versions
//!
//! `#MINV#` and `#MAXV#` are not real package versions. They stand for an
//! unbounded lower or upper range endpoint and every format orders them
//! below or above anything it can parse.

use std::cmp::Ordering;

/// A version which is always sorted first.
pub const MIN_VERSION: &str = "#MINV#";

/// A version which is always sorted last.
pub const MAX_VERSION: &str = "#MAXV#";

/// Returns true if `version` is one of the two reserved sentinel strings.
pub fn is_sentinel(version: &str) -> bool {
    matches!(version.trim(), MIN_VERSION | MAX_VERSION)
}

/// A parsed version of some format, extended with the two sentinel bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bounded<T> {
    Min,
    Version(T),
    Max,
}

impl<T> Bounded<T> {
    /// Convert the reserved literals to `Min`/`Max` and hand everything else
    /// to the format's own parser.
    pub fn parse_with<E, F>(input: &str, parse: F) -> Result<Self, E>
    where
        F: FnOnce(&str) -> Result<T, E>,
    {
        match input.trim() {
            MIN_VERSION => Ok(Bounded::Min),
            MAX_VERSION => Ok(Bounded::Max),
            _ => parse(input).map(Bounded::Version),
        }
    }

    /// Order two bounded values, using `cmp` only when both are parsed versions.
    pub fn cmp_by<F>(&self, other: &Self, cmp: F) -> Ordering
    where
        F: FnOnce(&T, &T) -> Ordering,
    {
        match (self, other) {
            (Bounded::Min, Bounded::Min) | (Bounded::Max, Bounded::Max) => Ordering::Equal,
            (Bounded::Min, _) | (_, Bounded::Max) => Ordering::Less,
            (_, Bounded::Min) | (Bounded::Max, _) => Ordering::Greater,
            (Bounded::Version(a), Bounded::Version(b)) => cmp(a, b),
        }
    }

    /// Order this value against a plain parsed version.
    pub fn cmp_version<F>(&self, other: &T, cmp: F) -> Ordering
    where
        F: FnOnce(&T, &T) -> Ordering,
    {
        match self {
            Bounded::Min => Ordering::Less,
            Bounded::Max => Ordering::Greater,
            Bounded::Version(v) => cmp(v, other),
        }
    }

    pub fn map<U, F>(self, f: F) -> Bounded<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Bounded::Min => Bounded::Min,
            Bounded::Version(v) => Bounded::Version(f(v)),
            Bounded::Max => Bounded::Max,
        }
    }

    pub fn as_version(&self) -> Option<&T> {
        match self {
            Bounded::Version(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse_number(s: &str) -> Result<u32, std::num::ParseIntError> {
        s.trim().parse()
    }

    #[rstest]
    #[case("#MINV#", Bounded::Min)]
    #[case("  #MAXV# ", Bounded::Max)]
    #[case("42", Bounded::Version(42))]
    fn parse_with_recognizes_sentinels(#[case] input: &str, #[case] expected: Bounded<u32>) {
        assert_eq!(Bounded::parse_with(input, parse_number).unwrap(), expected);
    }

    #[test]
    fn parse_with_propagates_parser_error() {
        assert!(Bounded::parse_with("nope", parse_number).is_err());
    }

    #[rstest]
    #[case(Bounded::Min, Bounded::Min, Ordering::Equal)]
    #[case(Bounded::Max, Bounded::Max, Ordering::Equal)]
    #[case(Bounded::Min, Bounded::Max, Ordering::Less)]
    #[case(Bounded::Max, Bounded::Min, Ordering::Greater)]
    #[case(Bounded::Min, Bounded::Version(0), Ordering::Less)]
    #[case(Bounded::Version(u32::MAX), Bounded::Max, Ordering::Less)]
    #[case(Bounded::Version(3), Bounded::Version(2), Ordering::Greater)]
    fn cmp_by_orders_bounds(
        #[case] a: Bounded<u32>,
        #[case] b: Bounded<u32>,
        #[case] expected: Ordering,
    ) {
        assert_eq!(a.cmp_by(&b, |x, y| x.cmp(y)), expected);
    }

    #[test]
    fn is_sentinel_ignores_surrounding_whitespace() {
        assert!(is_sentinel(" #MINV#"));
        assert!(is_sentinel("#MAXV#\n"));
        assert!(!is_sentinel("#MINV"));
    }
}
