//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk, applying
//! environment overrides and validating the result.
//!
//! # Configuration File Locations
//!
//! The configuration file is searched in the following order:
//!
//! 1. Path given as the `CONFIG_FILE` CLI argument (must exist)
//! 2. Default location (optional):
//!    - **Linux/macOS:** `~/.google-calendar-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.google-calendar-mcp\config.json`
//!
//! # Environment Overrides
//!
//! `GOOGLE_CREDENTIALS_FILE`, `CALENDAR_ID` and `CALENDAR_TIMEZONE` take
//! precedence over the file. With no file at the default location, the
//! environment alone must supply the required settings.

mod settings;

pub use settings::{
    CalendarSettings, Config, LoggingConfig, ENV_CALENDAR_ID, ENV_CREDENTIALS_FILE, ENV_TIMEZONE,
};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.google-calendar-mcp/`
/// - **Windows:** `%USERPROFILE%\.google-calendar-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".google-calendar-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads the configuration using the process environment for overrides.
///
/// If `path` is `None`, uses the platform-specific default location when a
/// file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - Required settings are missing or invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Loads the configuration using `env` to look up environment overrides.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) => read_config_file(p)?,
        None => match default_config_path() {
            Some(p) if p.exists() => read_config_file(&p)?,
            _ => Config::default(),
        },
    };

    config.apply_env(env);

    // Validate the configuration
    config.validate()?;

    Ok(config)
}

fn read_config_file(config_path: &Path) -> Result<Config, ConfigError> {
    if !config_path.exists() {
        return Err(ConfigError::NotFound {
            path: config_path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.to_path_buf(),
        source: e,
    })
}
