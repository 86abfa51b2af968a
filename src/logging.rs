//! tracing setup for the console binaries.
//!
//! Diagnostics go to stderr so stdout stays reserved for tables and command
//! output. An optional daily-rolling JSON file is written through
//! tracing-appender's non-blocking writer; keep the returned guard alive until
//! exit or buffered lines are lost.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::ConsoleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `warn,estate_console=debug`.
    pub filter: String,
    pub format: LogFormat,
    /// Rolling log file; the file name is used as prefix for each day's file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, ConsoleError> {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
        eprintln!("warning: invalid log filter '{}': {e}", config.filter);
        EnvFilter::new("warn")
    });

    let stderr_layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let (file_layer, guard) = match config.file.as_deref() {
        Some(path) => {
            let (directory, prefix) = split_log_path(path);
            let appender = tracing_appender::rolling::daily(directory, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConsoleError::Logging(e.to_string()))?;

    Ok(guard)
}

/// `logs/estate.log` -> (`logs`, `estate.log`); a bare name logs to the cwd.
fn split_log_path(path: &Path) -> (PathBuf, PathBuf) {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let prefix = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("estate_console.log"));
    (directory, prefix)
}
