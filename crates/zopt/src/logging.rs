//! Structured logging setup.
//!
//! The library only emits `tracing` events; nothing is printed until a
//! subscriber is installed, either by the application or through
//! [`enable_logging`].

use std::env;
use std::fs::{File, OpenOptions};
use std::io;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives, e.g. `debug` or `zopt=debug,zopt_engine=trace`.
pub const TRACE_ENV: &str = "ZOPT_TRACE";
/// `pretty` (default) or `json`.
pub const FORMAT_ENV: &str = "ZOPT_LOG_FORMAT";
/// Optional file receiving a copy of every event.
pub const FILE_ENV: &str = "ZOPT_LOG_FILE";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid ZOPT_LOG_FORMAT {0:?} (expected 'json' or 'pretty')")]
    InvalidFormat(String),
    #[error("Failed to open log file {path}: {source}")]
    LogFile { path: String, source: io::Error },
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

fn open_log_file(path: &str) -> Result<Mutex<File>, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Mutex::new)
        .map_err(|source| LoggingError::LogFile {
            path: path.to_string(),
            source,
        })
}

fn map_init_err<E: std::fmt::Display>(err: E) -> LoggingError {
    LoggingError::Init(err.to_string())
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if level.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

/// Whether `format` selects JSON output.
fn parse_format(format: &str) -> Result<bool, LoggingError> {
    if format.eq_ignore_ascii_case("json") {
        Ok(true)
    } else if format.eq_ignore_ascii_case("pretty") {
        Ok(false)
    } else {
        Err(LoggingError::InvalidFormat(format.to_string()))
    }
}

/// Install a global subscriber writing to stderr.
///
/// When `level` is `None`, this reads `ZOPT_TRACE` if set and defaults to
/// `off` otherwise. Returns `Ok(false)` if a subscriber is already configured.
pub fn enable_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level_value = level
        .map(str::to_string)
        .or_else(|| env::var(TRACE_ENV).ok())
        .unwrap_or_else(|| "off".to_string());
    let filter = build_filter(&level_value)?;

    let format = env::var(FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());
    let use_json = parse_format(&format)?;
    let log_file = env::var(FILE_ENV).ok();

    if use_json {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .json();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .json();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    } else {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .pretty();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .pretty();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    }

    Ok(true)
}
