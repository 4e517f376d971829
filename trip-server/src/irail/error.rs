//! iRail client error types.

/// Errors from the iRail HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum IrailError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by iRail")]
    RateLimited,

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Client could not be set up
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl IrailError {
    /// Whether the request ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, IrailError::Http(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = IrailError::Api {
            status: 404,
            message: "Station not found".into(),
        };
        assert_eq!(err.to_string(), "API error 404: Station not found");

        let err = IrailError::Json {
            message: "expected a sequence".into(),
            body: Some("{}".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("expected a sequence"));

        assert_eq!(IrailError::RateLimited.to_string(), "rate limited by iRail");
        assert!(!IrailError::RateLimited.is_timeout());
    }
}
