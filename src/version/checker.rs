//! Matching installed packages against vulnerability advisories

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::version::error::VersionError;
use crate::version::registry::FormatRegistry;
use crate::version::sentinel::{MAX_VERSION, MIN_VERSION};

/// A package found installed in an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub version_format: String,
}

/// A vulnerability affecting one package of one version format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    /// Vulnerability identifier
    pub name: String,
    pub package: String,
    pub version_format: String,
    /// Range expression of affected versions, in the format's own syntax
    #[serde(default)]
    pub affected_range: Option<String>,
    /// First version carrying the fix. `#MINV#` marks a package that was
    /// never affected, `#MAXV#` one that has no fix yet.
    #[serde(default)]
    pub fixed_in: Option<String>,
}

/// Outcome of checking one package against one advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AffectedStatus {
    /// Installed version is vulnerable
    Affected,
    /// Installed version already contains the fix
    Fixed,
    /// Package was never affected
    NotAffected,
}

/// Result of matching an advisory against an installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub vulnerability: String,
    pub package: String,
    pub installed_version: String,
    pub fixed_in: Option<String>,
    pub status: AffectedStatus,
}

/// Decide whether `version` is affected by `advisory`
///
/// An affected range takes precedence over a fixed-in version. An advisory
/// carrying neither affects every version.
pub fn check_affected(
    registry: &FormatRegistry,
    version: &str,
    advisory: &Advisory,
) -> Result<AffectedStatus, VersionError> {
    let format = advisory.version_format.as_str();
    registry.valid(format, version)?;

    if let Some(range) = &advisory.affected_range {
        return Ok(if registry.in_range(format, version, range)? {
            AffectedStatus::Affected
        } else {
            AffectedStatus::NotAffected
        });
    }

    let Some(fixed_in) = &advisory.fixed_in else {
        return Ok(AffectedStatus::Affected);
    };

    let status = match fixed_in.trim() {
        MIN_VERSION => AffectedStatus::NotAffected,
        MAX_VERSION => AffectedStatus::Affected,
        _ => match registry.compare(format, version, fixed_in)? {
            Ordering::Less => AffectedStatus::Affected,
            Ordering::Equal | Ordering::Greater => AffectedStatus::Fixed,
        },
    };
    Ok(status)
}

/// Check every advisory against the installed packages it names
///
/// Packages with an unknown format or an unparseable version, and advisories
/// that fail to evaluate, are logged and skipped.
pub fn match_packages(
    registry: &FormatRegistry,
    packages: &[InstalledPackage],
    advisories: &[Advisory],
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for package in packages {
        if let Err(e) = registry.valid(&package.version_format, &package.version) {
            warn!(
                "Skipping package '{}' {}: {}",
                package.name, package.version, e
            );
            continue;
        }

        let matching = advisories.iter().filter(|advisory| {
            advisory.package == package.name && advisory.version_format == package.version_format
        });

        for advisory in matching {
            match check_affected(registry, &package.version, advisory) {
                Ok(status) => {
                    debug!(
                        "{} {} is {:?} by {}",
                        package.name, package.version, status, advisory.name
                    );
                    findings.push(Finding {
                        vulnerability: advisory.name.clone(),
                        package: package.name.clone(),
                        installed_version: package.version.clone(),
                        fixed_in: advisory.fixed_in.clone(),
                        status,
                    });
                }
                Err(e) => {
                    warn!(
                        "Failed to evaluate advisory '{}' for package '{}': {}",
                        advisory.name, package.name, e
                    );
                }
            }
        }
    }

    findings
}
