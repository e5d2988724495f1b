//! Logging setup for the cc-obs binary.
//!
//! Hook commands talk to the host agent over stdout, so logs never go there:
//! they are written to stderr and, optionally, to a file through a
//! non-blocking appender.

use crate::config::{EnvError, EnvParser};
use crate::errors::{ObsError, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `warn` or `cc_obs=debug`.
    pub level: String,
    pub format: LogFormat,
    /// Append logs to this file as well.
    pub file: Option<PathBuf>,
    /// Write logs to stderr.
    pub stderr: bool,
    /// Problems found while reading the environment, reported once logging is up.
    pub env_errors: Vec<EnvError>,
}

impl LogConfig {
    /// Read `CC_OBS_LOG_LEVEL`, `CC_OBS_LOG_FORMAT` and `CC_OBS_LOG_FILE`.
    pub fn from_env(default_level: &str) -> Self {
        Self::from_parser(EnvParser::new(), default_level)
    }

    pub fn from_parser(mut parser: EnvParser, default_level: &str) -> Self {
        let level = parser.get_log_level("LOG_LEVEL", default_level).value;
        let format = parser.get_choice("LOG_FORMAT", &["pretty", "json"], "pretty");
        let format = LogFormat::parse(&format.value);
        let file = parser.get_path("LOG_FILE").map(|s| s.value);
        Self {
            level,
            format,
            file,
            stderr: false,
            env_errors: parser.take_errors(),
        }
    }

    #[must_use]
    pub fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// Keeps background log writers alive; flushes them on drop.
#[must_use]
pub struct LoggingGuards {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
///
/// A subscriber that is already installed (as in tests) is left in place. A
/// log file that cannot be opened is reported and skipped; the other sinks
/// still come up.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuards> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = config.stderr.then(|| match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    });

    let mut file_guard = None;
    let mut file_error = None;
    let file_layer = match config.file.as_deref().map(open_log_file) {
        Some(Ok(file)) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            file_guard = Some(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        Some(Err(e)) => {
            file_error = Some(e);
            None
        }
        None => None,
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        if let Some(e) = &file_error {
            warn!("Log file disabled: {e}");
        }
        for err in &config.env_errors {
            warn!("{err}");
        }
    }

    Ok(LoggingGuards { _file: file_guard })
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ObsError::io(parent, e))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ObsError::io(path, e))
}
