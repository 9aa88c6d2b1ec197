//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/schoolcal/config.toml` by default:
//!
//! ```toml
//! debug = false
//! log_format = "compact"
//!
//! [calendar]
//! timezone = "America/Chicago"
//! week_start = "sunday"
//! max_occurrences = 1000
//! ```

use std::path::{Path, PathBuf};

use schoolcal_core::{CalendarSettings, LogFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Configuration for the schoolcal CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Debug mode.
    pub debug: bool,

    /// Log line format on stderr: pretty, compact or json.
    pub log_format: LogFormat,

    /// Engine settings passed to every query.
    pub calendar: CalendarSettings,
}

impl CliConfig {
    /// Loads configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path and rejects settings no
    /// command can run with.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        debug!(path = %path.display(), timezone = %config.calendar.timezone, "Loaded config");
        Ok(config)
    }

    /// Checks settings that parse fine but cannot be used.
    pub fn validate(&self) -> CliResult<()> {
        if self.calendar.max_occurrences == 0 {
            return Err(CliError::Config(
                "calendar.max_occurrences must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("schoolcal")
    }
}
