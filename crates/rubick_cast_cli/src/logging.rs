//! tracing subscriber setup. Logs go to stderr so stdout stays for summaries.

use std::io;

use anyhow::{Result, anyhow};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumLogFormat {
    Pretty,
    Json,
}

impl EnumLogFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("Unknown log format: {other}")),
        }
    }
}

/// Parse a level name; `verbose` forces `debug` unless the level is already finer.
pub fn parse_log_level(level: &str, if_verbose: bool) -> Result<LevelFilter> {
    let level_filter: LevelFilter = level
        .trim()
        .parse()
        .map_err(|_| anyhow!("Unknown log level: {level}"))?;
    if if_verbose && level_filter < LevelFilter::DEBUG {
        return Ok(LevelFilter::DEBUG);
    }
    Ok(level_filter)
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
///
/// A second call keeps the subscriber already installed.
pub fn init_logging(level: &str, format: EnumLogFormat, if_verbose: bool) -> Result<()> {
    let default_level = parse_log_level(level, if_verbose)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let result = match format {
        EnumLogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
        EnumLogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .try_init(),
    };
    match result {
        Ok(()) => Ok(()),
        // try_init only fails when a global subscriber or `log` logger is already set.
        Err(err) => {
            tracing::debug!(error = %err, "log subscriber already installed, keeping it");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_format() {
        assert_eq!(EnumLogFormat::parse("JSON").unwrap(), EnumLogFormat::Json);
        assert_eq!(EnumLogFormat::parse("pretty").unwrap(), EnumLogFormat::Pretty);
        assert!(EnumLogFormat::parse("xml").is_err());
    }

    #[test]
    fn test_verbose_raises_level_to_debug() {
        assert_eq!(parse_log_level("info", false).unwrap(), LevelFilter::INFO);
        assert_eq!(parse_log_level("info", true).unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_log_level("trace", true).unwrap(), LevelFilter::TRACE);
        assert!(parse_log_level("loud", false).is_err());
    }

    #[test]
    fn test_init_logging_twice_keeps_first_subscriber() {
        init_logging("warn", EnumLogFormat::Pretty, false).unwrap();
        init_logging("warn", EnumLogFormat::Json, false).unwrap();
        assert!(init_logging("loud", EnumLogFormat::Json, false).is_err());
    }
}
