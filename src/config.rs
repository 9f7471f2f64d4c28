//! Configuration for the pane-mcp server.
//!
//! Sources, lowest to highest precedence:
//! 1. built-in defaults
//! 2. `~/.config/pane-mcp/config.yaml` (or the `--config` path)
//! 3. `PANE_MCP_CLIENT_COMMAND` / `PANE_MCP_TIMEOUT_MS` environment variables
//! 4. command-line flags (applied by [`crate::cli`])
//!
//! A missing config file is not an error; nothing is ever written back.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `client_command`.
pub const CLIENT_COMMAND_ENV: &str = "PANE_MCP_CLIENT_COMMAND";
/// Environment variable overriding `timeout_ms`.
pub const TIMEOUT_MS_ENV: &str = "PANE_MCP_TIMEOUT_MS";

/// Terminal client program used when nothing else is configured.
pub const DEFAULT_CLIENT_COMMAND: &str = "pane-mcp-client";
/// Default bound on one terminal client round trip.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error in config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command line of the terminal client program; request verbs are
    /// appended as extra arguments.
    pub client_command: String,

    /// Upper bound on a single client call, in milliseconds.
    pub timeout_ms: u64,

    /// Log level (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: Option<String>,

    /// Debug log file; defaults to `pane_mcp_debug.log` in the temp dir.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_command: DEFAULT_CLIENT_COMMAND.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            log_level: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load from the default path, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("Config file {path:?} not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml_ng::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(command) = lookup(CLIENT_COMMAND_ENV)
            && !command.trim().is_empty()
        {
            self.client_command = command;
        }
        if let Some(timeout) = lookup(TIMEOUT_MS_ENV) {
            self.timeout_ms = timeout.trim().parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "{TIMEOUT_MS_ENV} must be a positive integer, got '{timeout}'"
                ))
            })?;
        }
        Ok(())
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        match shell_words::split(&self.client_command) {
            Ok(parts) if !parts.is_empty() => {}
            Ok(_) => {
                return Err(ConfigError::Validation(
                    "client_command must not be empty".to_string(),
                ));
            }
            Err(e) => {
                return Err(ConfigError::Validation(format!(
                    "client_command could not be parsed: {e}"
                )));
            }
        }
        if let Some(level) = &self.log_level
            && LevelFilter::from_str(level).is_err()
        {
            return Err(ConfigError::Validation(format!(
                "unknown log_level '{level}'"
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn log_level_filter(&self) -> Option<LevelFilter> {
        self.log_level
            .as_deref()
            .and_then(|level| LevelFilter::from_str(level).ok())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("pane-mcp")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("pane-mcp")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
