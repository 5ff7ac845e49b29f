//! Logging configuration using tracing

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogConfig, LogFormat};

/// Build the level filter: `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    filter_or_level(EnvFilter::try_from_default_env(), &config.level)
}

fn filter_or_level<E>(from_env: Result<EnvFilter, E>, level: &str) -> EnvFilter {
    from_env.unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global tracing subscriber
///
/// With `config.file` set, events go through a non-blocking writer to
/// `log_file`. The returned guard must be held until exit so buffered
/// events get flushed.
pub fn init(config: &LogConfig, log_file: &Path) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = env_filter(config);

    if config.file {
        let dir = log_file
            .parent()
            .ok_or_else(|| anyhow::anyhow!("invalid log path {}", log_file.display()))?;
        let file_name = log_file
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("invalid log path {}", log_file.display()))?;
        std::fs::create_dir_all(dir)?;

        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        install(config.format, filter, writer, false)?;
        Ok(Some(guard))
    } else {
        install(config.format, filter, std::io::stderr, true)?;
        Ok(None)
    }
}

fn install<W>(format: LogFormat, filter: EnvFilter, writer: W, ansi: bool) -> anyhow::Result<()>
where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);

    match format {
        LogFormat::Json => registry.with(layer.json()).try_init()?,
        LogFormat::Compact => registry.with(layer.compact()).try_init()?,
        LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_or_level_falls_back_to_configured_level() {
        let filter = filter_or_level(EnvFilter::try_new("versionfmt=not-a-level"), "debug");
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn filter_or_level_prefers_environment_filter() {
        let filter = filter_or_level(EnvFilter::try_new("warn"), "debug");
        assert_eq!(filter.to_string(), "warn");
    }
}
