//! Error types for the API client

use thiserror::Error;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// API client error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport or body decode failure from reqwest
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the service
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Whether this error came from decoding a response body rather
    /// than from transport or the server itself.
    pub fn is_decode(&self) -> bool {
        matches!(self, ApiError::Http(err) if err.is_decode())
    }
}
