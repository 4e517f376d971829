//! Crowd-density client error types.

#[derive(Debug, thiserror::Error)]
pub enum BusyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {message}")]
    Json { message: String },

    #[error("invalid request: {0}")]
    InvalidInput(String),
}
