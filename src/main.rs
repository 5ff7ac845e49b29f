use anyhow::Context;
use clap::Parser;
use tracing::debug;

use versionfmt::cli::{self, Cli};
use versionfmt::config::{self, EngineConfig};
use versionfmt::logging;
use versionfmt::version::formats;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = EngineConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let _guard = logging::init(&config.log, &config::log_path())?;
    debug!("Loaded config: {:?}", config);

    let registry =
        formats::from_config(&config.formats).context("failed to build format registry")?;

    let stdout = std::io::stdout();
    cli::execute(&cli.command, &registry, &mut stdout.lock())
}
