use thiserror::Error;

/// Errors returned while validating, comparing or range-testing versions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("unknown version format: {0}")]
    UnknownVersionFormat(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("range spec can not be parsed: {0}")]
    RangeSpecUnparseable(String),

    #[error("range spec specified local part, which is not permitted: {0}")]
    LocalVersionNotPermitted(String),
}

/// Misconfiguration detected while building a [`FormatRegistry`](crate::version::registry::FormatRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("could not register a parser with an empty name")]
    EmptyName,

    #[error("parser registered twice for format: {0}")]
    DuplicateFormat(String),
}
