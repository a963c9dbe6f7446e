//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Environment variables may fill in or override the calendar settings.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable overriding [`Config::credentials_file`].
pub const ENV_CREDENTIALS_FILE: &str = "GOOGLE_CREDENTIALS_FILE";

/// Environment variable overriding [`Config::calendar_id`].
pub const ENV_CALENDAR_ID: &str = "CALENDAR_ID";

/// Environment variable overriding [`Config::timezone`].
pub const ENV_TIMEZONE: &str = "CALENDAR_TIMEZONE";

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Path to the Google credentials JSON (service account or authorised user).
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    /// Calendar used when a tool call does not name one.
    #[serde(default)]
    pub calendar_id: Option<String>,

    /// IANA timezone name used to interpret dates and times.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Calendar settings resolved from a validated [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSettings {
    /// Path to the credentials file.
    pub credentials_file: PathBuf,
    /// Default calendar identifier.
    pub calendar_id: String,
    /// Timezone name, if configured. Unknown names fall back to UTC later.
    pub timezone: Option<String>,
}

impl Config {
    /// Applies environment overrides using the given lookup function.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = var(ENV_CREDENTIALS_FILE) {
            self.credentials_file = Some(PathBuf::from(path));
        }
        if let Some(id) = var(ENV_CALENDAR_ID) {
            self.calendar_id = Some(id);
        }
        if let Some(tz) = var(ENV_TIMEZONE) {
            self.timezone = Some(tz);
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calendar_settings().map(|_| ())
    }

    /// Returns the calendar settings, checking that the required ones are present.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials file or calendar ID is missing,
    /// or the calendar ID is blank.
    pub fn calendar_settings(&self) -> Result<CalendarSettings, ConfigError> {
        let credentials_file =
            self.credentials_file
                .clone()
                .ok_or(ConfigError::MissingSetting {
                    field: "credentials_file",
                    env_var: ENV_CREDENTIALS_FILE,
                })?;

        let calendar_id = self
            .calendar_id
            .clone()
            .ok_or(ConfigError::MissingSetting {
                field: "calendar_id",
                env_var: ENV_CALENDAR_ID,
            })?;

        if calendar_id.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "calendar_id must not be blank".to_string(),
            });
        }

        Ok(CalendarSettings {
            credentials_file,
            calendar_id,
            timezone: self.timezone.clone(),
        })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
