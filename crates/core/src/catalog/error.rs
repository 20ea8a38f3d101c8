//! Error types for the catalog client.

use thiserror::Error;

/// Errors surfaced by catalog/playback API calls.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Credential exchange or token refresh failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested resource does not exist (or is not visible to us).
    #[error("not found: {0}")]
    NotFound(String),

    /// The service is throttling us.
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// Any other non-success response.
    #[error("api error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
