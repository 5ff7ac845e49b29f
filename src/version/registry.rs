//! Name-keyed registry of version formats
//!
//! The registry is built once at the composition root and handed to every
//! consumer by reference. Callers never touch a format's internal version
//! type; they go through the helpers below with a format name.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use indexmap::IndexMap;
use tracing::debug;

use crate::version::error::{RegistryError, VersionError};
use crate::version::parser::VersionParser;

type ParserMap = IndexMap<String, Arc<dyn VersionParser>>;

/// Registry mapping format names to their [`VersionParser`]
#[derive(Default)]
pub struct FormatRegistry {
    parsers: RwLock<ParserMap>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Register a parser under `name`
    ///
    /// Empty names and names that are already registered are rejected.
    pub fn register(
        &self,
        name: &str,
        parser: Arc<dyn VersionParser>,
    ) -> Result<(), RegistryError> {
        let mut parsers = self
            .parsers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        insert_parser(&mut parsers, name, parser)
    }

    /// Read access to the parser map. The map is only ever inserted into, so
    /// a poisoned lock still holds a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, ParserMap> {
        self.parsers.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the parser registered under `name`, if any
    pub fn get_parser(&self, name: &str) -> Option<Arc<dyn VersionParser>> {
        self.read().get(name).cloned()
    }

    /// Names of all registered formats, in registration order
    pub fn formats(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    fn require_parser(&self, format: &str) -> Result<Arc<dyn VersionParser>, VersionError> {
        self.get_parser(format)
            .ok_or_else(|| VersionError::UnknownVersionFormat(format.to_string()))
    }

    /// Returns an error if `version` is not a valid version of `format`
    pub fn valid(&self, format: &str, version: &str) -> Result<(), VersionError> {
        let parser = self.require_parser(format)?;
        if !parser.valid(version) {
            return Err(VersionError::InvalidVersion(version.to_string()));
        }
        Ok(())
    }

    /// Compare two versions of `format`
    pub fn compare(&self, format: &str, a: &str, b: &str) -> Result<Ordering, VersionError> {
        self.require_parser(format)?.compare(a, b)
    }

    /// Check whether `version` lies inside `range` according to `format`
    pub fn in_range(&self, format: &str, version: &str, range: &str) -> Result<bool, VersionError> {
        self.require_parser(format)?.in_range(version, range)
    }

    /// Derive the fixed-in version of `range` according to `format`
    pub fn fixed_in(&self, format: &str, range: &str) -> Result<String, VersionError> {
        self.require_parser(format)?.fixed_in(range)
    }

    /// Sort `versions` ascending according to `format`
    ///
    /// Every entry is validated first so the sort never sees a comparison error.
    pub fn sort(&self, format: &str, versions: &[String]) -> Result<Vec<String>, VersionError> {
        let parser = self.require_parser(format)?;
        if let Some(invalid) = versions.iter().find(|v| !parser.valid(v)) {
            return Err(VersionError::InvalidVersion(invalid.clone()));
        }

        let mut sorted = versions.to_vec();
        sorted.sort_by(|a, b| parser.compare(a, b).unwrap_or(Ordering::Equal));
        Ok(sorted)
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}

/// Fallible builder used to assemble a [`FormatRegistry`] at startup
#[derive(Default)]
pub struct RegistryBuilder {
    parsers: ParserMap,
}

impl RegistryBuilder {
    pub fn register(
        mut self,
        name: &str,
        parser: Arc<dyn VersionParser>,
    ) -> Result<Self, RegistryError> {
        insert_parser(&mut self.parsers, name, parser)?;
        Ok(self)
    }

    pub fn build(self) -> FormatRegistry {
        FormatRegistry {
            parsers: RwLock::new(self.parsers),
        }
    }
}

fn insert_parser(
    parsers: &mut ParserMap,
    name: &str,
    parser: Arc<dyn VersionParser>,
) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        return Err(RegistryError::EmptyName);
    }
    if parsers.contains_key(name) {
        return Err(RegistryError::DuplicateFormat(name.to_string()));
    }

    debug!("Registering version format '{}'", name);
    parsers.insert(name.to_string(), parser);
    Ok(())
}
