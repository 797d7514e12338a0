//! Error types for the Rekkari domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Rekkari operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Vehicle lookup errors ---
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    // --- Completion provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Session store errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors raised inside the vehicle resolution pipeline.
///
/// All of these are expected and recoverable: the resolver absorbs them
/// into a `found: false` record rather than failing the chat request.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Navigation to {url} failed: {details}")]
    NavigationFailed { url: String, details: String },

    #[error("Control not found: {selector}")]
    ControlNotFound { selector: String },

    #[error("Page interaction failed: {0}")]
    InteractionFailed(String),

    #[error("Response body unavailable for request {request_id}: {details}")]
    BodyUnavailable {
        request_id: String,
        details: String,
    },

    #[error("Browser close failed: {0}")]
    CloseFailed(String),

    #[error("Step timed out after {timeout_secs}s: {step}")]
    StepTimeout { step: String, timeout_secs: u64 },
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Resolution already in progress for session {0}")]
    ResolutionInProgress(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn lookup_error_displays_correctly() {
        let err = Error::Lookup(LookupError::NavigationFailed {
            url: "https://kolariautot.com/ABC-123".into(),
            details: "net::ERR_TIMED_OUT".into(),
        });
        assert!(err.to_string().contains("ABC-123"));
        assert!(err.to_string().contains("ERR_TIMED_OUT"));
    }
}
