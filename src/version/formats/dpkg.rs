//! dpkg version format
//!
//! Versions have the shape `[epoch:]upstream[-revision]` and are ordered
//! with dpkg's `verrevcmp` (see deb-version(5)).

use std::cmp::Ordering;

use crate::version::error::VersionError;
use crate::version::parser::VersionParser;
use crate::version::range;
use crate::version::sentinel::Bounded;

/// Name under which the dpkg format is registered
pub const PARSER_NAME: &str = "dpkg";

const UPSTREAM_SYMBOLS: &[char] = &['.', '-', '+', '~', ':', '_'];
const REVISION_SYMBOLS: &[char] = &['.', '+', '~', '_'];

#[derive(Debug, Clone, PartialEq, Eq)]
struct DpkgVersion {
    epoch: u64,
    upstream: String,
    revision: String,
}

impl DpkgVersion {
    fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersion(input.to_string());
        let s = input.trim();
        if s.is_empty() {
            return Err(invalid());
        }

        let (epoch, rest) = match s.split_once(':') {
            Some((epoch, rest)) => {
                let epoch: i64 = epoch.parse().map_err(|_| invalid())?;
                (u64::try_from(epoch).map_err(|_| invalid())?, rest)
            }
            None => (0, s),
        };

        // The revision starts at the last hyphen.
        let (upstream, revision) = rest.rsplit_once('-').unwrap_or((rest, ""));

        if upstream.is_empty() {
            return Err(invalid());
        }
        let upstream_ok = upstream
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || UPSTREAM_SYMBOLS.contains(&c));
        let revision_ok = revision
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || REVISION_SYMBOLS.contains(&c));
        if !upstream_ok || !revision_ok {
            return Err(invalid());
        }

        Ok(Self {
            epoch,
            upstream: upstream.to_string(),
            revision: revision.to_string(),
        })
    }

    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| verrevcmp(&self.upstream, &other.upstream))
            .then_with(|| verrevcmp(&self.revision, &other.revision))
    }
}

fn parse_bounded(input: &str) -> Result<Bounded<DpkgVersion>, VersionError> {
    Bounded::parse_with(input, DpkgVersion::parse)
}

/// Sort weight of a non-digit character: tilde sorts before everything,
/// even the end of the string, and letters sort before other symbols.
fn order(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(b'~') => -1,
        Some(c) => i32::from(c) + 256,
    }
}

fn verrevcmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        // Non-digit prefix
        while (i < a.len() && !a[i].is_ascii_digit()) || (j < b.len() && !b[j].is_ascii_digit()) {
            let ac = order(a.get(i).copied());
            let bc = order(b.get(j).copied());
            if ac != bc {
                return ac.cmp(&bc);
            }
            i += 1;
            j += 1;
        }

        // Digit run, compared numerically
        while i < a.len() && a[i] == b'0' {
            i += 1;
        }
        while j < b.len() && b[j] == b'0' {
            j += 1;
        }
        let mut first_diff = Ordering::Equal;
        while i < a.len() && a[i].is_ascii_digit() && j < b.len() && b[j].is_ascii_digit() {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }
        if i < a.len() && a[i].is_ascii_digit() {
            return Ordering::Greater;
        }
        if j < b.len() && b[j].is_ascii_digit() {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}

/// Version parser for dpkg based packages
pub struct DpkgParser;

impl VersionParser for DpkgParser {
    fn valid(&self, version: &str) -> bool {
        parse_bounded(version).is_ok()
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering, VersionError> {
        let a = parse_bounded(a)?;
        let b = parse_bounded(b)?;
        Ok(a.cmp_by(&b, DpkgVersion::cmp))
    }

    fn in_range(&self, version: &str, range: &str) -> Result<bool, VersionError> {
        let v = parse_bounded(version)?;
        range::evaluate(range, |operand| {
            let operand = parse_bounded(operand)
                .map_err(|_| VersionError::RangeSpecUnparseable(operand.to_string()))?;
            Ok(v.cmp_by(&operand, DpkgVersion::cmp))
        })
    }
}
