//! Version format abstraction shared by every package ecosystem

use std::cmp::Ordering;

#[cfg(test)]
use mockall::automock;

use crate::version::error::VersionError;

/// Trait for format-specific version parsing, ordering and range matching
///
/// Each ecosystem orders versions differently:
/// - rpm: epoch:version-release compared segment by segment (rpmvercmp)
/// - dpkg: epoch:upstream-revision compared with dpkg's verrevcmp
/// - pep440: Python release model with pre/post/dev/local parts
/// - semver: major.minor.patch with prerelease identifiers
///
/// Every implementation must accept [`MIN_VERSION`](crate::version::sentinel::MIN_VERSION)
/// and [`MAX_VERSION`](crate::version::sentinel::MAX_VERSION) and order them
/// below and above every other version.
#[cfg_attr(test, automock)]
pub trait VersionParser: Send + Sync {
    /// Attempt to parse a version string and report its success
    fn valid(&self, version: &str) -> bool;

    /// Compare two version strings of this format
    fn compare(&self, a: &str, b: &str) -> Result<Ordering, VersionError>;

    /// Check whether `version` satisfies the range expression `range`
    fn in_range(&self, version: &str, range: &str) -> Result<bool, VersionError>;

    /// Derive the fixed-in version from a range expression
    ///
    /// Every built-in format returns its input unchanged.
    fn fixed_in(&self, range: &str) -> Result<String, VersionError> {
        Ok(range.to_string())
    }
}
