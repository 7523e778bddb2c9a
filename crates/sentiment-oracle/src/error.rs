//! Error types for sentiment-oracle

use thiserror::Error;

/// Errors that can occur when talking to the sentiment service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// Client could not be configured
    #[error("Invalid oracle configuration: {0}")]
    Config(String),

    /// Transport-level failure (connect, reset, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The call did not complete within the configured timeout
    #[error("sentiment service timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The service answered with a non-success status
    #[error("sentiment service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON
    #[error("unexpected sentiment service response: {0}")]
    Decode(String),
}
