//! Logging setup for the command-line tool

use std::str::FromStr;

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is not set
    pub level: Level,
    /// Whether to include file and line information
    pub file_info: bool,
    /// Whether to log spans
    pub log_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: Level::INFO,
            file_info: false,
            log_spans: false,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new(level: Level) -> Self {
        LoggingConfig {
            level,
            ..Default::default()
        }
    }

    /// Enable file and line information in logs
    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }

    /// Enable span logging
    pub fn with_spans(mut self) -> Self {
        self.log_spans = true;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_ascii_lowercase()))
    }
}

/// Install the global subscriber; logs go to stderr so frame listings on
/// stdout stay clean
pub fn setup_logging(config: &LoggingConfig) -> Result<()> {
    let span_events = if config.log_spans {
        FmtSpan::ACTIVE
    } else {
        FmtSpan::NONE
    };

    fmt::Subscriber::builder()
        .with_env_filter(config.filter())
        .with_span_events(span_events)
        .with_file(config.file_info)
        .with_line_number(config.file_info)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("cannot install logger: {e}"))
}

/// Parse a log level from a string
pub fn parse_log_level(level: &str) -> Result<Level> {
    Level::from_str(level).map_err(|_| anyhow!("Invalid log level: {level}"))
}
