//! RPM version format
//!
//! Versions have the shape `[epoch:]version[-release]` and are ordered with
//! the rpmvercmp algorithm: each component is split into digit runs, letter
//! runs and single tildes, which are then compared pairwise.

use std::cmp::Ordering;

use tracing::debug;

use crate::version::error::VersionError;
use crate::version::parser::VersionParser;
use crate::version::range;
use crate::version::sentinel::Bounded;

/// Name under which the rpm format is registered
pub const PARSER_NAME: &str = "rpm";

const ALLOWED_SYMBOLS: &[char] = &['.', '-', '+', '~', ':', '_'];

#[derive(Debug, Clone, PartialEq, Eq)]
struct RpmVersion {
    epoch: u64,
    version: String,
    release: String,
}

impl RpmVersion {
    fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersion(input.to_string());
        let s = input.trim();
        if s.is_empty() {
            return Err(invalid());
        }

        let (epoch, rest_start) = match s.find(':') {
            Some(sep) => {
                // A leading minus parses, so negative epochs are caught here too.
                let epoch: i64 = s[..sep].parse().map_err(|_| invalid())?;
                let epoch = u64::try_from(epoch).map_err(|_| invalid())?;
                (epoch, sep + 1)
            }
            None => (0, 0),
        };

        // The release starts at the first hyphen of the whole string.
        let (version, release) = match s.find('-') {
            Some(sep) if sep >= rest_start => (&s[rest_start..sep], &s[sep + 1..]),
            Some(_) => return Err(invalid()),
            None => (&s[rest_start..], ""),
        };

        if version.is_empty() {
            return Err(invalid());
        }
        if !version.chars().all(is_allowed) || !release.chars().all(is_allowed) {
            return Err(invalid());
        }

        Ok(Self {
            epoch,
            version: version.to_string(),
            release: release.to_string(),
        })
    }

    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| rpmvercmp(&self.version, &other.version))
            .then_with(|| rpmvercmp(&self.release, &other.release))
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_SYMBOLS.contains(&c)
}

fn parse_bounded(input: &str) -> Result<Bounded<RpmVersion>, VersionError> {
    Bounded::parse_with(input, RpmVersion::parse)
}

/// Split a version component into letter runs, digit runs and single tildes.
/// Everything else separates segments and is dropped.
fn segments(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut segs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'~' {
            segs.push(&s[i..i + 1]);
            i += 1;
        } else if c.is_ascii_digit() || c.is_ascii_alphabetic() {
            let same_kind: fn(&u8) -> bool = if c.is_ascii_digit() {
                u8::is_ascii_digit
            } else {
                u8::is_ascii_alphabetic
            };
            let start = i;
            while i < bytes.len() && same_kind(&bytes[i]) {
                i += 1;
            }
            segs.push(&s[start..i]);
        } else {
            i += 1;
        }
    }
    segs
}

fn is_tilde(seg: &str) -> bool {
    seg == "~"
}

fn is_numeric(seg: &str) -> bool {
    seg.as_bytes()[0].is_ascii_digit()
}

/// Compare two version or release strings the way rpm's `rpmvercmp` does
fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let segs_a = segments(a);
    let segs_b = segments(b);

    for (&seg_a, &seg_b) in segs_a.iter().zip(segs_b.iter()) {
        match (is_tilde(seg_a), is_tilde(seg_b)) {
            (true, true) => continue,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        let ordering = match (is_numeric(seg_a), is_numeric(seg_b)) {
            // Numbers are always newer than letters.
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (true, true) => {
                let a = seg_a.trim_start_matches('0');
                let b = seg_b.trim_start_matches('0');
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (false, false) => seg_a.cmp(seg_b),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    let shared = segs_a.len().min(segs_b.len());
    match segs_a.len().cmp(&segs_b.len()) {
        Ordering::Equal => Ordering::Equal,
        // A trailing tilde on the longer side marks a pre-release.
        Ordering::Greater if is_tilde(segs_a[shared]) => Ordering::Less,
        Ordering::Less if is_tilde(segs_b[shared]) => Ordering::Greater,
        longer => longer,
    }
}

/// Version parser for rpm based packages
pub struct RpmParser;

impl VersionParser for RpmParser {
    fn valid(&self, version: &str) -> bool {
        parse_bounded(version).is_ok()
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering, VersionError> {
        let a = parse_bounded(a)?;
        let b = parse_bounded(b)?;
        Ok(a.cmp_by(&b, RpmVersion::cmp))
    }

    fn in_range(&self, version: &str, range: &str) -> Result<bool, VersionError> {
        let v = parse_bounded(version)?;
        debug!("Evaluating rpm range '{}' for '{}'", range, version);
        range::evaluate(range, |operand| {
            let operand = parse_bounded(operand)
                .map_err(|_| VersionError::RangeSpecUnparseable(operand.to_string()))?;
            Ok(v.cmp_by(&operand, RpmVersion::cmp))
        })
    }
}
