//! PEP 440 version format
//!
//! Implements Python's version scheme (https://peps.python.org/pep-0440/):
//! - `1!2.0` - epoch
//! - `2.0a1`, `2.0b2`, `2.0rc1` - pre-releases
//! - `2.0.post1`, `2.0-1` - post-releases
//! - `2.0.dev3` - development releases
//! - `2.0+ubuntu.1` - local versions
//!
//! and its version specifiers (`~=`, `==`, `!=`, `<=`, `>=`, `<`, `>`, `===`),
//! joined with commas.

use std::cmp::Ordering;

use regex::{Captures, Regex};
use tracing::debug;

use crate::version::error::VersionError;
use crate::version::parser::VersionParser;
use crate::version::sentinel::Bounded;

/// Name under which the pep440 format is registered
pub const PARSER_NAME: &str = "pep440";

// From appendix B of PEP 440, case-insensitive.
const VERSION_PATTERN: &str = concat!(
    r"(?i)^v?",
    r"(?:(?P<epoch>[1-9][0-9]*)!)?",
    r"(?P<release>(?:0|[1-9][0-9]*)(?:\.(?:0|[1-9][0-9]*))*)",
    r"(?:[-_.]?(?P<pretype>alpha|a|beta|b|rc|c|preview|pre)[-_.]?(?P<prerelease>0|[1-9][0-9]*)?)?",
    r"(?P<post>-(?P<postrelease1>[0-9]+)|(?:[-_.]?post[-_.]?(?P<postrelease2>0|[1-9][0-9]*)?))?",
    r"(?P<dev>[-_.]?dev(?P<devrelease>0|[1-9][0-9]*)?)?",
    r"(?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?$",
);

/// One dot-separated component of the release part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReleaseSegment {
    Number(u64),
    /// Matches any segment; only produced for `.*` and `~=` specifiers.
    Wildcard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PreKind {
    Alpha,
    Beta,
    Rc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pep440Version {
    epoch: u64,
    release: Vec<ReleaseSegment>,
    /// `None` is a final release, which sorts after every pre-release.
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Vec<String>,
}

impl Pep440Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let epoch = self.epoch.cmp(&other.epoch);
        if epoch != Ordering::Equal {
            return epoch;
        }

        match compare_release(&self.release, &other.release) {
            None => return Ordering::Equal,
            Some(Ordering::Equal) => {}
            Some(ordering) => return ordering,
        }

        // A dev release comes before the release it leads up to.
        match (self.dev, other.dev) {
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            _ => {}
        }

        let pre = match (self.pre, other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        };

        pre.then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev.cmp(&other.dev))
            .then_with(|| compare_local(&self.local, &other.local))
    }

    fn without_local(self) -> Self {
        Self {
            local: Vec::new(),
            ..self
        }
    }
}

/// Compare release segments, padding the shorter side with zeros.
///
/// Returns `None` when a wildcard segment is reached, which makes the two
/// versions equal regardless of their remaining parts.
fn compare_release(a: &[ReleaseSegment], b: &[ReleaseSegment]) -> Option<Ordering> {
    let zero = ReleaseSegment::Number(0);
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(zero);
        let y = b.get(i).copied().unwrap_or(zero);
        match (x, y) {
            (ReleaseSegment::Wildcard, _) | (_, ReleaseSegment::Wildcard) => return None,
            (ReleaseSegment::Number(x), ReleaseSegment::Number(y)) if x != y => {
                return Some(x.cmp(&y));
            }
            _ => {}
        }
    }
    Some(Ordering::Equal)
}

fn compare_local(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ordering = compare_local_part(x, y);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}

/// Numeric local segments sort after alphanumeric ones.
fn compare_local_part(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Version specifier operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Compatible,
    Equal,
    NotEqual,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
}

impl Operator {
    /// Split a clause into its operator and the remaining operand.
    /// Longer operators are tried first so `>=` is not read as `>`.
    fn split(clause: &str) -> Option<(Self, &str)> {
        const OPERATORS: &[(&str, Operator)] = &[
            ("~=", Operator::Compatible),
            ("==", Operator::Equal),
            ("!=", Operator::NotEqual),
            (">=", Operator::GreaterEqual),
            ("<=", Operator::LessEqual),
            (">", Operator::Greater),
            ("<", Operator::Less),
        ];
        OPERATORS
            .iter()
            .find_map(|(prefix, op)| clause.strip_prefix(*prefix).map(|rest| (*op, rest)))
    }
}

/// Version parser for Python packages
pub struct Pep440Parser {
    version_re: Regex,
}

impl Pep440Parser {
    pub fn new() -> Self {
        Self {
            version_re: Regex::new(VERSION_PATTERN).unwrap(),
        }
    }

    fn parse(&self, input: &str) -> Result<Pep440Version, VersionError> {
        let invalid = || VersionError::InvalidVersion(input.to_string());
        let caps = self.version_re.captures(input.trim()).ok_or_else(invalid)?;
        build_version(&caps).ok_or_else(invalid)
    }

    fn parse_bounded(&self, input: &str) -> Result<Bounded<Pep440Version>, VersionError> {
        Bounded::parse_with(input, |s| self.parse(s))
    }

    /// Parse the operand of a specifier clause. Local versions are not
    /// allowed in specifiers.
    fn parse_spec(&self, clause: &str, operand: &str) -> Result<Pep440Version, VersionError> {
        let spec = self
            .parse(operand)
            .map_err(|_| VersionError::RangeSpecUnparseable(clause.to_string()))?;
        if !spec.local.is_empty() {
            return Err(VersionError::LocalVersionNotPermitted(clause.to_string()));
        }
        Ok(spec)
    }

    fn evaluate_clause(
        &self,
        version: &Bounded<Pep440Version>,
        clause: &str,
    ) -> Result<bool, VersionError> {
        let clause = clause.trim();
        let (op, operand) = Operator::split(clause)
            .ok_or_else(|| VersionError::RangeSpecUnparseable(clause.to_string()))?;

        let (operand, glob) = match op {
            Operator::Equal | Operator::NotEqual => match operand.strip_suffix(".*") {
                Some(prefix) => (prefix, true),
                None => (operand, false),
            },
            _ => (operand, false),
        };

        let mut spec = self.parse_spec(clause, operand)?;
        if glob {
            spec.release.push(ReleaseSegment::Wildcard);
        }
        let cmp = |v: &Bounded<Pep440Version>| v.cmp_version(&spec, Pep440Version::cmp);

        let result = match op {
            Operator::Compatible => {
                let mut prefix = spec.clone();
                if let Some(last) = prefix.release.last_mut() {
                    *last = ReleaseSegment::Wildcard;
                }
                cmp(version) != Ordering::Less
                    && version.cmp_version(&prefix, Pep440Version::cmp) == Ordering::Equal
            }
            Operator::Equal => cmp(version) == Ordering::Equal,
            Operator::NotEqual => cmp(version) != Ordering::Equal,
            Operator::GreaterEqual => cmp(version) != Ordering::Less,
            Operator::LessEqual => cmp(version) != Ordering::Greater,
            Operator::Greater => {
                // `> 1.1` does not match post-releases of 1.1.
                let adjusted = if spec.post.is_none() {
                    version.clone().map(|v| Pep440Version { post: None, ..v })
                } else {
                    version.clone()
                };
                cmp(&adjusted) == Ordering::Greater
            }
            Operator::Less => {
                // `< 1.1` does not match pre-releases of 1.1.
                let adjusted = if spec.pre.is_none() {
                    version.clone().map(|v| Pep440Version { pre: None, ..v })
                } else {
                    version.clone()
                };
                cmp(&adjusted) == Ordering::Less
            }
        };
        Ok(result)
    }
}

impl Default for Pep440Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(caps: &Captures<'_>, name: &str) -> Option<Option<u64>> {
    match caps.name(name) {
        Some(m) => m.as_str().parse().ok().map(Some),
        None => Some(None),
    }
}

/// Build a version from regex captures. Returns `None` when a number does
/// not fit into a `u64`.
fn build_version(caps: &Captures<'_>) -> Option<Pep440Version> {
    let epoch = parse_number(caps, "epoch")?.unwrap_or(0);

    let release = caps
        .name("release")?
        .as_str()
        .split('.')
        .map(|part| part.parse().ok().map(ReleaseSegment::Number))
        .collect::<Option<Vec<_>>>()?;

    let pre = match caps.name("pretype") {
        Some(kind) => {
            let kind = match kind.as_str().to_ascii_lowercase().as_str() {
                "a" | "alpha" => PreKind::Alpha,
                "b" | "beta" => PreKind::Beta,
                _ => PreKind::Rc,
            };
            Some((kind, parse_number(caps, "prerelease")?.unwrap_or(0)))
        }
        None => None,
    };

    let post = match caps.name("post") {
        Some(_) => Some(
            parse_number(caps, "postrelease1")?
                .or(parse_number(caps, "postrelease2")?)
                .unwrap_or(0),
        ),
        None => None,
    };

    let dev = match caps.name("dev") {
        Some(_) => Some(parse_number(caps, "devrelease")?.unwrap_or(0)),
        None => None,
    };

    let local = caps
        .name("local")
        .map(|m| {
            m.as_str()
                .split(['-', '_', '.'])
                .map(str::to_ascii_lowercase)
                .collect()
        })
        .unwrap_or_default();

    Some(Pep440Version {
        epoch,
        release,
        pre,
        post,
        dev,
        local,
    })
}

impl VersionParser for Pep440Parser {
    fn valid(&self, version: &str) -> bool {
        self.parse_bounded(version).is_ok()
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering, VersionError> {
        let a = self.parse_bounded(a)?;
        let b = self.parse_bounded(b)?;
        Ok(a.cmp_by(&b, Pep440Version::cmp))
    }

    fn in_range(&self, version: &str, range: &str) -> Result<bool, VersionError> {
        let range = range.trim();
        if let Some(literal) = range.strip_prefix("===") {
            return Ok(version == literal.trim());
        }

        // Local versions never take part in specifier matching.
        let v = self.parse_bounded(version)?.map(Pep440Version::without_local);
        debug!("Evaluating pep440 specifier '{}' for '{}'", range, version);

        for clause in range.split(',') {
            if !self.evaluate_clause(&v, clause)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
