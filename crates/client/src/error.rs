//! Error types for the SDK
//!
//! Validation failures are always surfaced to the caller. Delivery failures of
//! the production consumers are reported as `Ok(false)` instead, so only the
//! debug consumer produces [`Error::Debug`].

use thiserror::Error;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building, validating or delivering events
#[derive(Debug, Error)]
pub enum Error {
    // =========================================================================
    // Validation errors
    // =========================================================================
    /// Event data violates the schema rules
    #[error("illegal data: {0}")]
    IllegalData(String),

    // =========================================================================
    // Delivery errors
    // =========================================================================
    /// Debug mode failure (always fatal)
    #[error("debug mode: {0}")]
    Debug(#[from] DebugError),

    /// HTTP client could not be constructed
    #[error("http client error: {0}")]
    Http(String),

    /// IO error (file consumer, config file)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Encoding errors
    // =========================================================================
    /// JSON serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A `data_list` payload could not be decoded
    #[error("encoding error: {0}")]
    Encoding(String),

    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Configuration could not be parsed or is inconsistent
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Create an IllegalData error
    pub fn illegal(msg: impl Into<String>) -> Self {
        Self::IllegalData(msg.into())
    }

    /// Whether this is a validation failure
    pub fn is_illegal_data(&self) -> bool {
        matches!(self, Self::IllegalData(_))
    }
}

/// Failures raised by the debug consumer
#[derive(Debug, Error)]
pub enum DebugError {
    /// Endpoint URL could not be parsed
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl {
        /// URL as configured
        url: String,
        /// Parser message
        reason: String,
    },

    /// Transport failed before a response was read
    #[error("failed to connect to server: {0}")]
    Connect(String),

    /// Server answered with a status >= 300
    #[error("unexpected response from server: HTTP {status}")]
    UnexpectedResponse {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_illegal_data() {
        let err = Error::illegal("the max length of [distinct_id] is 255");
        assert_eq!(
            err.to_string(),
            "illegal data: the max length of [distinct_id] is 255"
        );
        assert!(err.is_illegal_data());
    }

    #[test]
    fn test_error_display_unexpected_response() {
        let err: Error = DebugError::UnexpectedResponse {
            status: 400,
            body: "bad".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "debug mode: unexpected response from server: HTTP 400"
        );
        assert!(!err.is_illegal_data());
    }

    #[test]
    fn test_error_display_invalid_url() {
        let err = DebugError::InvalidUrl {
            url: "::".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid server url '::': relative URL without a base"
        );
    }

    #[test]
    fn test_error_from_io() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
