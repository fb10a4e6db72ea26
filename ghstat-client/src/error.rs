//! Error types for the Greenhouse client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to Greenhouse
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Greenhouse returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The session is missing or expired
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// An expected element was missing from the page
    #[error("element '{0}' not found on page")]
    MissingElement(String),

    /// Failed to parse a value read from the page
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// Saved session state could not be read or written
    #[error("session store error: {0}")]
    Session(String),

    /// Invalid client configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if re-authenticating could fix this error
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::NotAuthenticated(_))
            || matches!(self, Self::ApiError { status: 401 | 403, .. })
    }
}
