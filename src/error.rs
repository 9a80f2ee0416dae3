//! Huginn error types

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The model's reply could not be interpreted as the requested shape,
    /// even after stripping surrounding prose. Distinct from transport
    /// failures so callers can tell "model malformed" from "call failed".
    #[error("parse error: {0}")]
    Parse(String),

    #[error("empty response from model")]
    EmptyResponse,

    /// The reply parsed but did not satisfy the caller's expectations.
    /// Inside the regeneration loop this is a retryable condition, not an
    /// exception; it only surfaces wrapped in `ExhaustedRetries`.
    #[error("validation failed: {0}")]
    Validation(String),

    // Configuration errors
    #[error("no provider configured")]
    NoProvider,

    #[error("configuration error: {0}")]
    Configuration(String),

    /// The regeneration controller ran out of attempts. Carries the last
    /// underlying failure for diagnostics.
    #[error("exhausted {attempts} generation attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: Box<HuginnError> },
}

impl HuginnError {
    /// Map an HTTP status to the matching error variant.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => HuginnError::AuthenticationFailed,
            429 => HuginnError::RateLimited,
            _ => HuginnError::Api { status, message },
        }
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
