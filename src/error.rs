//! Error types for google-calendar-mcp configuration.
//!
//! Calendar adapter errors live in [`crate::calendar::CalendarError`];
//! tool argument errors in [`crate::mcp::tools::InvalidArguments`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// A required setting was provided neither by the file nor the environment.
    #[error("missing required setting '{field}' (set it in the configuration file or via {env_var})")]
    MissingSetting {
        /// Name of the configuration file field.
        field: &'static str,
        /// Environment variable that can supply it instead.
        env_var: &'static str,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}
