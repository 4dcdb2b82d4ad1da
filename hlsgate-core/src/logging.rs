// Logging setup for the gateway
//
// One fmt layer (JSON or pretty) behind an EnvFilter. Output goes to stdout
// unless `logging.file_path` names an append-mode log file.

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `logging.level`. Fails if the level or
/// log file is invalid, or if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let writer = log_writer(config.file_path.as_deref())?;
    let to_terminal = config.file_path.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    match config.format.as_str() {
        "json" => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true)
                    .with_writer(writer),
            )
            .try_init()?,
        _ => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(to_terminal)
                    .with_target(true)
                    .with_file(false)
                    .with_writer(writer),
            )
            .try_init()?,
    }

    Ok(())
}

/// Stdout, or the given file opened for appending
fn log_writer(file_path: Option<&str>) -> anyhow::Result<BoxMakeWriter> {
    let Some(path) = file_path else {
        return Ok(BoxMakeWriter::new(std::io::stdout));
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {path}: {e}"))?;
    Ok(BoxMakeWriter::new(Arc::new(file)))
}

fn parse_log_level(level: &str) -> anyhow::Result<Level> {
    level
        .trim()
        .to_ascii_lowercase()
        .replace("warning", "warn")
        .parse::<Level>()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {level}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level(" info ").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_log_writer_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hlsgate.log");
        std::fs::write(&path, "existing\n").unwrap();

        assert!(log_writer(path.to_str()).is_ok());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\n");
    }

    #[test]
    fn test_log_writer_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = log_writer(dir.path().to_str()).unwrap_err();
        assert!(err.to_string().contains("Failed to open log file"));
    }

    #[test]
    fn test_init_logging_rejects_unknown_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };

        assert!(init_logging(&config).is_err());
    }
}
