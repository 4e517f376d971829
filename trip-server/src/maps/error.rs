//! Maps client error types.

use crate::planner::{GeocodeError, OracleError};

/// Errors from the Maps HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum MapsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The service answered but reported a non-OK status
    #[error("status {status}{}", detail(.message))]
    Status {
        status: String,
        message: Option<String>,
    },

    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Well-formed JSON that does not answer the request
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

fn detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl MapsError {
    fn is_timeout(&self) -> bool {
        matches!(self, MapsError::Http(e) if e.is_timeout())
    }
}

impl From<MapsError> for GeocodeError {
    fn from(err: MapsError) -> Self {
        match err {
            e if e.is_timeout() => GeocodeError::Timeout,
            MapsError::Status { status, .. } => GeocodeError::Status { status },
            e => GeocodeError::Unavailable(e.to_string()),
        }
    }
}

impl From<MapsError> for OracleError {
    fn from(err: MapsError) -> Self {
        match err {
            e if e.is_timeout() => OracleError::Timeout,
            MapsError::Status { status, .. } => OracleError::Status { status },
            MapsError::Malformed(msg) => OracleError::Malformed(msg),
            e => OracleError::Unavailable(e.to_string()),
        }
    }
}
