//! Command line interface

use std::cmp::Ordering;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;

use crate::version::checker::{self, Advisory, InstalledPackage};
use crate::version::registry::FormatRegistry;
use crate::version::srpm;

#[derive(Debug, Parser)]
#[command(name = "versionfmt")]
#[command(version, about = "Compare and range-match package versions across formats")]
pub struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered version formats
    Formats,
    /// Check that a version is valid for a format
    Valid { format: String, version: String },
    /// Compare two versions, printing `<`, `=` or `>`
    Compare {
        format: String,
        a: String,
        b: String,
    },
    /// Check whether a version lies in a range
    InRange {
        format: String,
        version: String,
        range: String,
    },
    /// Print the fixed-in version derived from a range
    FixedIn { format: String, range: String },
    /// Sort versions ascending
    Sort {
        format: String,
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// Split a source RPM file name into its parts
    SourceRpm { file_name: String },
    /// Match installed packages against advisories read from a JSON file
    Check { input: PathBuf },
}

/// Input document of the `check` command
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckInput {
    pub packages: Vec<InstalledPackage>,
    pub advisories: Vec<Advisory>,
}

fn ordering_symbol(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    }
}

/// Run `command` against `registry`, writing results to `out`
pub fn execute<W: Write>(
    command: &Command,
    registry: &FormatRegistry,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Formats => {
            for format in registry.formats() {
                writeln!(out, "{}", format)?;
            }
        }
        Command::Valid { format, version } => {
            registry.valid(format, version)?;
            writeln!(out, "valid")?;
        }
        Command::Compare { format, a, b } => {
            let ordering = registry.compare(format, a, b)?;
            writeln!(out, "{}", ordering_symbol(ordering))?;
        }
        Command::InRange {
            format,
            version,
            range,
        } => {
            writeln!(out, "{}", registry.in_range(format, version, range)?)?;
        }
        Command::FixedIn { format, range } => {
            writeln!(out, "{}", registry.fixed_in(format, range)?)?;
        }
        Command::Sort { format, versions } => {
            for version in registry.sort(format, versions)? {
                writeln!(out, "{}", version)?;
            }
        }
        Command::SourceRpm { file_name } => {
            let parsed = srpm::parse_source_rpm(file_name)?;
            writeln!(out, "name: {}", parsed.name)?;
            writeln!(out, "version: {}", parsed.version)?;
            writeln!(out, "release: {}", parsed.release)?;
            writeln!(out, "architecture: {}", parsed.architecture)?;
        }
        Command::Check { input } => {
            let content = std::fs::read_to_string(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let input: CheckInput = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", input.display()))?;

            let findings = checker::match_packages(registry, &input.packages, &input.advisories);
            info!(
                "Matched {} packages against {} advisories: {} findings",
                input.packages.len(),
                input.advisories.len(),
                findings.len()
            );
            serde_json::to_writer_pretty(&mut *out, &findings)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::version::formats;

    fn run(args: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("versionfmt").chain(args.iter().copied()))?;
        let registry = formats::with_default_formats()?;
        let mut out = Vec::new();
        execute(&cli.command, &registry, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[rstest]
    #[case(&["formats"], "rpm\ndpkg\npep440\nsemver\n")]
    #[case(&["valid", "rpm", "1:2.3-4.el7"], "valid\n")]
    #[case(&["compare", "rpm", "1.0", "1.0~rc1"], ">\n")]
    #[case(&["compare", "semver", "1.0.0+a", "1.0.0+b"], "=\n")]
    #[case(&["compare", "dpkg", "1.0-1", "1.0-2"], "<\n")]
    #[case(&["in-range", "pep440", "1.2.3", "~= 1.2"], "true\n")]
    #[case(&["in-range", "semver", "2.1.0", "^1.1.0"], "false\n")]
    #[case(&["fixed-in", "dpkg", ">= 1.0"], ">= 1.0\n")]
    #[case(&["sort", "dpkg", "1.0", "1.0~rc1", "0.9"], "0.9\n1.0~rc1\n1.0\n")]
    #[case(
        &["source-rpm", "glibc-2.17-260.el7.src.rpm"],
        "name: glibc\nversion: 2.17\nrelease: 260.el7\narchitecture: src\n"
    )]
    fn execute_prints_expected(#[case] args: &[&str], #[case] expected: &str) {
        assert_eq!(run(args).unwrap(), expected);
    }

    #[rstest]
    #[case(&["valid", "rpm", "0:"])]
    #[case(&["compare", "apk", "1", "2"])]
    #[case(&["in-range", "semver", "1.0.0", ">= 1.6"])]
    #[case(&["source-rpm", "glibc-2.17-260.el7.x86_64.rpm"])]
    #[case(&["sort", "semver"])]
    fn execute_reports_errors(#[case] args: &[&str]) {
        assert!(run(args).is_err());
    }

    #[test]
    fn check_prints_findings_as_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "packages": [
                    {"name": "requests", "version": "2.25.0", "versionFormat": "pep440"}
                ],
                "advisories": [
                    {
                        "name": "CVE-2023-32681",
                        "package": "requests",
                        "versionFormat": "pep440",
                        "affectedRange": ">= 2.3.0, < 2.31.0"
                    }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let output = run(&["check", path.to_str().unwrap()]).unwrap();
        let findings: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(findings[0]["vulnerability"], "CVE-2023-32681");
        assert_eq!(findings[0]["status"], "affected");
    }

    #[test]
    fn global_config_flag_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["versionfmt", "formats", "--config", "/tmp/c.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
    }
}
