//! Semantic versioning format
//!
//! Versions follow https://semver.org: `MAJOR.MINOR.PATCH[-prerelease][+build]`.
//! Build metadata is accepted and ignored for ordering.
//!
//! Ranges are OR-groups separated by `||`. Each group is a list of
//! comparators which must all hold:
//! - `>= 1.0.0`, `<= 1.0.0`, `> 1.0.0`, `< 1.0.0`
//! - `~1.2.0` - at least 1.2.0 with the same major, minor and prerelease
//! - `^1.2.0` - at least 1.2.0 with the same major and prerelease
//! - `1.2.0` - exact match
//! - `*` - any version

use std::cmp::Ordering;

use regex::Regex;
use tracing::debug;

use crate::version::error::VersionError;
use crate::version::parser::VersionParser;
use crate::version::sentinel::Bounded;

/// Name under which the semver format is registered
pub const PARSER_NAME: &str = "semver";

const VERSION_PATTERN: &str = concat!(
    r"(?P<major>0|[1-9][0-9]*)\.(?P<minor>0|[1-9][0-9]*)\.(?P<patch>0|[1-9][0-9]*)",
    r"(?:-(?P<prerelease>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?",
    r"(?:\+(?P<build>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?",
);

#[derive(Debug, Clone, PartialEq, Eq)]
struct SemVersion {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Vec<String>,
}

impl SemVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let core = (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch));
        if core != Ordering::Equal {
            return core;
        }

        // A version without prerelease identifiers has higher precedence.
        match (self.prerelease.is_empty(), other.prerelease.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_prerelease(&self.prerelease, &other.prerelease),
        }
    }

    /// Drop the components a `~` or `^` comparator ignores. Prerelease
    /// identifiers are kept.
    fn truncated(&self, truncate: Truncate) -> Self {
        Self {
            minor: match truncate {
                Truncate::Patch => self.minor,
                Truncate::MinorPatch => 0,
            },
            patch: 0,
            ..self.clone()
        }
    }
}

fn compare_prerelease(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ordering = compare_identifier(x, y);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}

/// Numeric identifiers always have lower precedence than alphanumeric ones.
fn compare_identifier(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Version parser for semver based ecosystems
pub struct SemverParser {
    version_re: Regex,
    comparator_re: Regex,
}

impl SemverParser {
    pub fn new() -> Self {
        Self {
            version_re: Regex::new(&format!("^{}$", VERSION_PATTERN)).unwrap(),
            comparator_re: Regex::new(&format!(r"(?:<=|>=|<|>|\^|~)?\s*{}", VERSION_PATTERN))
                .unwrap(),
        }
    }

    fn parse(&self, input: &str) -> Result<SemVersion, VersionError> {
        let invalid = || VersionError::InvalidVersion(input.to_string());
        let caps = self.version_re.captures(input.trim()).ok_or_else(invalid)?;
        let number = |name: &str| -> Result<u64, VersionError> {
            caps.name(name)
                .ok_or_else(invalid)?
                .as_str()
                .parse()
                .map_err(|_| invalid())
        };

        Ok(SemVersion {
            major: number("major")?,
            minor: number("minor")?,
            patch: number("patch")?,
            prerelease: caps
                .name("prerelease")
                .map(|m| m.as_str().split('.').map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }

    fn parse_bounded(&self, input: &str) -> Result<Bounded<SemVersion>, VersionError> {
        Bounded::parse_with(input, |s| self.parse(s))
    }

    /// Evaluate one OR-group. Every comparator in the group must hold, and
    /// nothing but whitespace may sit between comparators.
    fn evaluate_group(&self, v: &Bounded<SemVersion>, group: &str) -> Result<bool, VersionError> {
        let unparseable = || VersionError::RangeSpecUnparseable(group.trim().to_string());

        let mut comparators = Vec::new();
        let mut last_end = 0;
        for m in self.comparator_re.find_iter(group) {
            if !group[last_end..m.start()].trim().is_empty() {
                return Err(unparseable());
            }
            comparators.push(m.as_str());
            last_end = m.end();
        }
        if comparators.is_empty() || !group[last_end..].trim().is_empty() {
            return Err(unparseable());
        }

        for comparator in comparators {
            let (op, operand) = split_operator(comparator);
            let r = self.parse(operand).map_err(|_| unparseable())?;
            let ordering = v.cmp_version(&r, SemVersion::cmp);

            let satisfied = match op {
                ">=" => ordering != Ordering::Less,
                "<=" => ordering != Ordering::Greater,
                ">" => ordering == Ordering::Greater,
                "<" => ordering == Ordering::Less,
                "~" => ordering != Ordering::Less && same_prefix(v, &r, Truncate::Patch),
                "^" => ordering != Ordering::Less && same_prefix(v, &r, Truncate::MinorPatch),
                _ => ordering == Ordering::Equal,
            };
            if !satisfied {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy)]
enum Truncate {
    Patch,
    MinorPatch,
}

/// Sentinels have no components to share with a real version.
fn same_prefix(v: &Bounded<SemVersion>, r: &SemVersion, truncate: Truncate) -> bool {
    v.as_version().is_some_and(|v| {
        v.truncated(truncate).cmp(&r.truncated(truncate)) == Ordering::Equal
    })
}

impl Default for SemverParser {
    fn default() -> Self {
        Self::new()
    }
}

fn split_operator(comparator: &str) -> (&str, &str) {
    for op in [">=", "<=", ">", "<", "~", "^"] {
        if let Some(rest) = comparator.strip_prefix(op) {
            return (op, rest);
        }
    }
    ("", comparator)
}

impl VersionParser for SemverParser {
    fn valid(&self, version: &str) -> bool {
        self.parse_bounded(version).is_ok()
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering, VersionError> {
        let a = self.parse_bounded(a)?;
        let b = self.parse_bounded(b)?;
        Ok(a.cmp_by(&b, SemVersion::cmp))
    }

    fn in_range(&self, version: &str, range: &str) -> Result<bool, VersionError> {
        let range = range.trim();
        if range == "*" {
            return Ok(true);
        }

        let v = self.parse_bounded(version)?;
        debug!("Evaluating semver range '{}' for '{}'", range, version);

        for group in range.split("||") {
            if self.evaluate_group(&v, group)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::version::sentinel::{MAX_VERSION, MIN_VERSION};

    #[rstest]
    #[case(MIN_VERSION, true)]
    #[case(MAX_VERSION, true)]
    #[case("1.0.0", true)]
    #[case("1.0.0-alpha.1+build.5", true)]
    #[case(" 1.2.3 ", true)]
    #[case("1.0", false)]
    #[case("01.0.0", false)]
    #[case("v1.0.0", false)]
    #[case("1.0.0-", false)]
    #[case("1.0.0-al_pha", false)]
    #[case("invalid", false)]
    #[case("99999999999999999999999.0.0", false)]
    fn valid_returns_expected(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(SemverParser::new().valid(version), expected);
    }

    #[rstest]
    #[case("1.0.0", Ordering::Equal, "1.0.0")]
    #[case("1.0.0", Ordering::Less, "2.0.0")]
    #[case("1.10.0", Ordering::Greater, "1.9.0")]
    #[case("1.0.10", Ordering::Greater, "1.0.9")]
    #[case("1.0.0", Ordering::Greater, MIN_VERSION)]
    #[case("1.0.0", Ordering::Less, MAX_VERSION)]
    #[case(MIN_VERSION, Ordering::Equal, MIN_VERSION)]
    #[case(MAX_VERSION, Ordering::Equal, MAX_VERSION)]
    #[case(MIN_VERSION, Ordering::Less, MAX_VERSION)]
    // Prerelease
    #[case("1.0.0", Ordering::Greater, "1.0.0-alpha")]
    #[case("1.0.0-2", Ordering::Less, "1.0.0-a")]
    #[case("1.0.0-alpha", Ordering::Less, "1.0.0-alpha.2")]
    #[case("1.0.0-alpha.2", Ordering::Greater, "1.0.0-alpha.1")]
    #[case("1.0.0-alpha.2", Ordering::Less, "1.0.0-alpha.10")]
    #[case("1.0.0-alpha", Ordering::Less, "1.0.0-beta")]
    #[case("1.0.0-rc.1", Ordering::Greater, "1.0.0-beta.11")]
    // Build metadata is ignored
    #[case("1.0.0+0", Ordering::Equal, "1.0.0")]
    #[case("1.0.0+0.1", Ordering::Equal, "1.0.0+0.2")]
    #[case("1.0.0-rc.1+build", Ordering::Equal, "1.0.0-rc.1")]
    fn compare_returns_expected(#[case] a: &str, #[case] expected: Ordering, #[case] b: &str) {
        let parser = SemverParser::new();
        assert_eq!(parser.compare(a, b).unwrap(), expected, "{a} vs {b}");
        assert_eq!(parser.compare(b, a).unwrap(), expected.reverse(), "{b} vs {a}");
    }

    #[rstest]
    #[case("invalid", "1.0.0")]
    #[case("1.0.0", "1.0")]
    fn compare_rejects_invalid(#[case] a: &str, #[case] b: &str) {
        assert!(matches!(
            SemverParser::new().compare(a, b),
            Err(VersionError::InvalidVersion(_))
        ));
    }

    #[rstest]
    #[case("1.0.0", "*", true)]
    #[case("1.0.0", " * ", true)]
    #[case("1.0.0", "1.0.0", true)]
    #[case("1.0.1", "1.0.0", false)]
    #[case("1.0.0", ">= 1.0.0", true)]
    #[case("1.0.0", "> 1.0.0", false)]
    #[case("1.0.0", "<= 1.0.0", true)]
    #[case("1.0.0", "< 1.0.0", false)]
    #[case("1.5.0", ">= 1.1.0 < 2.0.0", true)]
    #[case("2.0.0", ">= 1.1.0 < 2.0.0", false)]
    #[case("1.5.0", ">=1.1.0 <2.0.0", true)]
    #[case("2.0.0-rc.1", ">= 1.1.0 < 2.0.0", true)]
    #[case("1.0.0", "< 1.1.0 || >= 2.0.0", true)]
    #[case("2.1.0", "< 1.1.0 || >= 2.0.0", true)]
    #[case("1.5.0", "< 1.1.0 || >= 2.0.0", false)]
    // Tilde
    #[case("1.2.3", "~1.2.0", true)]
    #[case("1.2.0", "~1.2.0", true)]
    #[case("1.3.0", "~1.2.0", false)]
    #[case("1.2.3", "~1.2.4", false)]
    #[case("1.1.2-rc.1", "~1.1.0", false)]
    #[case("1.1.2", "~1.1.0-beta", false)]
    #[case("1.1.5-beta.2", "~1.1.0-beta.2", true)]
    // Caret
    #[case("1.9.0", "^1.2.0", true)]
    #[case("2.0.0", "^1.2.0", false)]
    #[case("1.1.0", "^1.2.0", false)]
    #[case("1.5.0-rc.1", "^1.1.0", false)]
    // Sentinels
    #[case(MIN_VERSION, "< 0.0.0", true)]
    #[case(MIN_VERSION, ">= 0.0.0", false)]
    #[case(MAX_VERSION, ">= 1.0.0", true)]
    #[case(MAX_VERSION, ">= 1.0.0 < 2.0.0", false)]
    #[case(MAX_VERSION, "^1.0.0", false)]
    #[case(MIN_VERSION, "~1.0.0", false)]
    fn in_range_returns_expected(#[case] version: &str, #[case] range: &str, #[case] expected: bool) {
        assert_eq!(
            SemverParser::new().in_range(version, range).unwrap(),
            expected,
            "{version} in {range}"
        );
    }

    #[rstest]
    #[case("1.0.0", ">= 1.6")]
    #[case("1.0.0", "some nonsense")]
    #[case("1.0.0", "< 0.5.0 || >= 1.6")]
    #[case("invalid", "1.0.0")]
    #[case("1.0.0", "!= 1.0.0")]
    #[case("1.0.0", "=> 1.0.0")]
    #[case("1.0.0", "foo 1.0.0")]
    #[case("1.0.0", ">= 1.0.0 bar")]
    #[case("1.0.0", ">= 1.0.0, < 2.0.0")]
    fn in_range_rejects_malformed_input(#[case] version: &str, #[case] range: &str) {
        assert!(SemverParser::new().in_range(version, range).is_err());
    }

    #[test]
    fn in_range_rejects_negation_instead_of_reading_equality() {
        assert_eq!(
            SemverParser::new().in_range("1.0.0", "!= 1.0.0"),
            Err(VersionError::RangeSpecUnparseable("!= 1.0.0".to_string()))
        );
    }

    #[test]
    fn in_range_stops_at_first_matching_group() {
        // The second group is malformed but never reached.
        assert!(SemverParser::new().in_range("1.0.0", "1.0.0 || >= 1.6").unwrap());
    }

    #[test]
    fn fixed_in_is_passthrough() {
        assert_eq!(SemverParser::new().fixed_in("1.2.3").unwrap(), "1.2.3");
    }
}
