//! Log output for binaries embedding the engine.
//!
//! The engine only emits `tracing` events (`debug!` for query summaries,
//! `warn!` for inverted intervals, `trace!` for cache traffic). A binary
//! calls [`init_tracing`] once at startup to decide where they go.
//!
//! ```ignore
//! use schoolcal_core::tracing::{init_tracing, LogFormat, TracingConfig};
//!
//! init_tracing(TracingConfig::for_cli(false, LogFormat::Json)).expect("tracing already set");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt as layer_fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter directive: {0}")]
    Directive(#[from] tracing_subscriber::filter::ParseError),

    #[error("unknown log format: {0}")]
    UnknownFormat(String),
}

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Multi-line, for reading by eye
    Pretty,
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(TracingError::UnknownFormat(s.to_string())),
        }
    }
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for the `schoolcal` targets when no directive or `RUST_LOG` is given.
    pub level: Level,
    pub format: LogFormat,
    /// Print file, line and target of each event.
    pub with_source: bool,
    pub with_timestamps: bool,
    /// Filter directive that takes precedence over `RUST_LOG`.
    pub directive: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            with_source: false,
            with_timestamps: true,
            directive: None,
        }
    }
}

impl TracingConfig {
    /// Settings for a command-line run: warnings only, or everything down to
    /// `debug` with source locations when `debug` is set.
    #[must_use]
    pub fn for_cli(debug: bool, format: LogFormat) -> Self {
        if debug {
            Self {
                level: Level::DEBUG,
                format,
                with_source: true,
                with_timestamps: false,
                directive: None,
            }
        } else {
            Self {
                format,
                ..Self::default()
            }
        }
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// Directive used when neither `directive` nor `RUST_LOG` is set.
    pub fn default_directive(&self) -> String {
        format!("schoolcal={}", self.level)
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(directive) = &self.directive {
            return Ok(EnvFilter::try_new(directive)?);
        }
        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive())))
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if the directive does not parse or a subscriber is already
/// installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.env_filter()?;

    let layer = layer_fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_source)
        .with_line_number(config.with_source)
        .with_target(config.with_source);

    let layer = match (config.format, config.with_timestamps) {
        (LogFormat::Pretty, _) => layer.pretty().boxed(),
        (LogFormat::Json, _) => layer.json().boxed(),
        (LogFormat::Compact, true) => layer.compact().boxed(),
        (LogFormat::Compact, false) => layer.compact().without_time().boxed(),
    };

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(filter).with(layer))?;
    Ok(())
}
