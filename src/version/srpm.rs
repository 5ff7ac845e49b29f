//! Source RPM file name splitting
//!
//! RPM package metadata names the source package it was built from as a
//! file name such as `glibc-2.17-260.el7.src.rpm`. The name itself may
//! contain hyphens, so the file name is taken apart from the right.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceRpmError {
    #[error("unexpected package type, expect: 'rpm', got: '{0}'")]
    UnexpectedPackageType(String),

    #[error("unexpected package architecture, expect: 'src' or 'nosrc', got: '{0}'")]
    UnexpectedArchitecture(String),

    #[error("unexpected package release, expect: not empty")]
    EmptyRelease,

    #[error("unexpected package version, expect: not empty")]
    EmptyVersion,

    #[error("unexpected package name, expect: not empty")]
    EmptyName,

    #[error("unexpected termination while parsing {0} of '{1}'")]
    UnexpectedTermination(&'static str, String),
}

/// Parts of a source RPM file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRpm {
    pub name: String,
    pub version: String,
    pub release: String,
    pub architecture: String,
}

/// Split `name-version-release.arch.rpm` into its parts
///
/// Only the last two hyphens separate fields; any other hyphen is part of
/// the name, so a version that contains a hyphen cannot be recovered.
pub fn parse_source_rpm(file_name: &str) -> Result<SourceRpm, SourceRpmError> {
    let terminated = |stage| SourceRpmError::UnexpectedTermination(stage, file_name.to_string());

    let (rest, package_type) = file_name
        .rsplit_once('.')
        .ok_or_else(|| terminated("package type"))?;
    if package_type != "rpm" {
        return Err(SourceRpmError::UnexpectedPackageType(package_type.to_string()));
    }

    let (rest, architecture) = rest
        .rsplit_once('.')
        .ok_or_else(|| terminated("architecture"))?;
    if architecture != "src" && architecture != "nosrc" {
        return Err(SourceRpmError::UnexpectedArchitecture(architecture.to_string()));
    }

    let (rest, release) = rest.rsplit_once('-').ok_or_else(|| terminated("release"))?;
    if release.is_empty() {
        return Err(SourceRpmError::EmptyRelease);
    }

    let (name, version) = rest.rsplit_once('-').ok_or_else(|| terminated("version"))?;
    if version.is_empty() {
        return Err(SourceRpmError::EmptyVersion);
    }
    if name.is_empty() {
        return Err(SourceRpmError::EmptyName);
    }

    Ok(SourceRpm {
        name: name.to_string(),
        version: version.to_string(),
        release: release.to_string(),
        architecture: architecture.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("glibc-2.17-260.el7.src.rpm", "glibc", "2.17", "260.el7", "src")]
    #[case("python-dateutil-2.8.1-1.fc33.nosrc.rpm", "python-dateutil", "2.8.1", "1.fc33", "nosrc")]
    #[case("a-1-1.src.rpm", "a", "1", "1", "src")]
    #[case("perl-Mozilla-CA-20130114-5.el7.src.rpm", "perl-Mozilla-CA", "20130114", "5.el7", "src")]
    fn parse_source_rpm_splits_fields(
        #[case] input: &str,
        #[case] name: &str,
        #[case] version: &str,
        #[case] release: &str,
        #[case] architecture: &str,
    ) {
        assert_eq!(
            parse_source_rpm(input).unwrap(),
            SourceRpm {
                name: name.to_string(),
                version: version.to_string(),
                release: release.to_string(),
                architecture: architecture.to_string(),
            }
        );
    }

    #[test]
    fn parse_source_rpm_attributes_extra_hyphen_to_name() {
        let srpm = parse_source_rpm("foo-1.0-beta-1.src.rpm").unwrap();
        assert_eq!(srpm.name, "foo-1.0");
        assert_eq!(srpm.version, "beta");
    }

    #[rstest]
    #[case("glibc-2.17-260.el7.src.deb", SourceRpmError::UnexpectedPackageType("deb".to_string()))]
    #[case("glibc-2.17-260.el7.x86_64.rpm", SourceRpmError::UnexpectedArchitecture("x86_64".to_string()))]
    #[case("glibc-2.17-.src.rpm", SourceRpmError::EmptyRelease)]
    #[case("glibc--260.src.rpm", SourceRpmError::EmptyVersion)]
    #[case("-2.17-260.src.rpm", SourceRpmError::EmptyName)]
    #[case("rpm", SourceRpmError::UnexpectedTermination("package type", "rpm".to_string()))]
    #[case("src.rpm", SourceRpmError::UnexpectedTermination("architecture", "src.rpm".to_string()))]
    #[case("glibc.src.rpm", SourceRpmError::UnexpectedTermination("release", "glibc.src.rpm".to_string()))]
    #[case("glibc-1.src.rpm", SourceRpmError::UnexpectedTermination("version", "glibc-1.src.rpm".to_string()))]
    fn parse_source_rpm_rejects_malformed(#[case] input: &str, #[case] expected: SourceRpmError) {
        assert_eq!(parse_source_rpm(input), Err(expected));
    }
}
