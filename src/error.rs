//! Error types for lm-bridge

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`BridgeError`]
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for lm-bridge
///
/// Failed completion calls are not reported through this type; they come back
/// as [`crate::services::CompletionResult::Failure`] so callers can pick their
/// own retry policy.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider name not known to this crate
    #[error("unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Credential or model registry failure
    #[error("Store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_provider_message() {
        let err = BridgeError::UnsupportedProvider {
            provider: "Replicate".into(),
        };
        assert_eq!(err.to_string(), "unsupported provider: Replicate");
    }

    #[test]
    fn test_store_message() {
        let err = BridgeError::Store("corrupt store at /tmp/s.json: expected a JSON object".into());
        assert_eq!(
            err.to_string(),
            "Store error: corrupt store at /tmp/s.json: expected a JSON object"
        );
    }
}
