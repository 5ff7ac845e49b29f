//! Built-in version formats

pub mod dpkg;
pub mod pep440;
pub mod rpm;
pub mod semver;

use std::sync::Arc;

pub use dpkg::DpkgParser;
pub use pep440::Pep440Parser;
pub use rpm::RpmParser;
pub use semver::SemverParser;

use crate::config::FormatsConfig;
use crate::version::error::RegistryError;
use crate::version::parser::VersionParser;
use crate::version::registry::FormatRegistry;

/// Build a registry holding every built-in format
pub fn with_default_formats() -> Result<FormatRegistry, RegistryError> {
    from_config(&FormatsConfig::default())
}

/// Build a registry holding the built-in formats enabled in `config`
pub fn from_config(config: &FormatsConfig) -> Result<FormatRegistry, RegistryError> {
    let candidates: [(&str, bool, Arc<dyn VersionParser>); 4] = [
        (rpm::PARSER_NAME, config.rpm.enabled, Arc::new(RpmParser)),
        (dpkg::PARSER_NAME, config.dpkg.enabled, Arc::new(DpkgParser)),
        (pep440::PARSER_NAME, config.pep440.enabled, Arc::new(Pep440Parser::new())),
        (semver::PARSER_NAME, config.semver.enabled, Arc::new(SemverParser::new())),
    ];

    candidates
        .into_iter()
        .filter(|(_, enabled, _)| *enabled)
        .try_fold(FormatRegistry::builder(), |builder, (name, _, parser)| {
            builder.register(name, parser)
        })
        .map(|builder| builder.build())
}
