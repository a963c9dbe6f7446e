//! Error types for calendar operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors that can occur while talking to the calendar provider.
///
/// The `Display` text of every variant is shown to the agent verbatim, so it
/// carries the underlying cause inline.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// Credentials file could not be read.
    #[error("failed to read credentials file {path}: {source}")]
    CredentialsRead {
        /// Path to the credentials file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Credentials file is not a supported Google credentials document.
    #[error("failed to parse credentials file {path}: {source}")]
    CredentialsParse {
        /// Path to the credentials file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The service account private key could not be loaded or used for signing.
    #[error("service account key error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The token endpoint refused to issue an access token.
    #[error("failed to obtain access token: {message}")]
    Auth {
        /// Description of the failure.
        message: String,
    },

    /// The HTTP request could not be completed.
    #[error("calendar request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The calendar API answered with an error status.
    #[error("calendar API returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// A date argument is not `YYYY-MM-DD`.
    #[error("invalid date '{value}': expected YYYY-MM-DD ({source})")]
    InvalidDate {
        /// The rejected input.
        value: String,
        /// Underlying parse error.
        #[source]
        source: chrono::ParseError,
    },

    /// A time argument is not `HH:MM`.
    #[error("invalid time '{value}': expected HH:MM in 24-hour format ({source})")]
    InvalidTime {
        /// The rejected input.
        value: String,
        /// Underlying parse error.
        #[source]
        source: chrono::ParseError,
    },

    /// The provider returned a timestamp that is not RFC 3339.
    #[error("invalid timestamp '{value}' from calendar API ({source})")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Underlying parse error.
        #[source]
        source: chrono::ParseError,
    },

    /// The local date and time is skipped by a DST transition.
    #[error("{value} does not exist in timezone {timezone}")]
    NonexistentLocalTime {
        /// The local date and time.
        value: String,
        /// Timezone name.
        timezone: String,
    },

    /// A partial schedule update needs a time the event does not have.
    #[error("event has no {field}; provide {field} explicitly")]
    MissingEventTime {
        /// Which field is missing (`date`, `start_time` or `end_time`).
        field: &'static str,
    },

    /// The requested window is outside the representable date range.
    #[error("date range out of bounds")]
    OutOfRange,

    /// An API URL could not be built.
    #[error("invalid calendar API URL: {message}")]
    Url {
        /// Description of the failure.
        message: String,
    },
}
