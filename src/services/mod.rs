//! Service layer for outbound model providers
//!
//! - [`lm_studio`]: OpenAI-compatible chat adapter for LM Studio servers
//! - [`hugging_face`]: inference-endpoint verification
//! - [`reasoning`]: stripping `<think>` blocks from model output

pub mod hugging_face;
pub mod lm_studio;
pub mod reasoning;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::{AdapterConfig, ProviderType},
    error::{BridgeError, Result},
    messages::Message,
};

/// Failure categories of a completion call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionErrorKind {
    /// Remote service answered with a non-success status
    ApiError,
    /// Service could not be reached
    ConnectionError,
    /// Deadline exceeded
    TimeoutError,
    /// Anything else, e.g. an unreadable response body
    UnexpectedError,
}

impl std::fmt::Display for CompletionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ApiError => "API_ERROR",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
        };
        f.write_str(name)
    }
}

/// Outcome of a completion call
///
/// Serializes to `{"content", "raw"}` or `{"error", "message"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionResult {
    Success {
        /// First choice's content with any reasoning block removed
        content: String,
        /// Provider response body as received
        raw: serde_json::Value,
    },
    Failure {
        error: CompletionErrorKind,
        message: String,
    },
}

impl CompletionResult {
    pub(crate) fn failure(error: CompletionErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Content on success
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Success { content, .. } => Some(content),
            Self::Failure { .. } => None,
        }
    }

    /// Error kind on failure
    #[must_use]
    pub const fn error_kind(&self) -> Option<CompletionErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(*error),
        }
    }
}

/// Core trait for chat adapters
///
/// Only `complete` reports failures, and it does so as a value. Listing and
/// reachability degrade to defaults instead.
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    /// Get the provider
    fn provider(&self) -> ProviderType;

    /// Get the model name sent on the wire
    fn model(&self) -> &str;

    /// Normalized endpoint including the versioned path
    fn endpoint(&self) -> &str;

    /// Run one completion over `messages`
    async fn complete(&self, messages: &[Message], max_tokens: Option<u32>) -> CompletionResult;

    /// Model identifiers served by the endpoint, or the configured fallback
    async fn list_models(&self) -> Vec<String>;

    /// True when the listing endpoint answers with a success status
    async fn check_reachable(&self, credential: Option<&str>) -> bool;
}

/// Create a chat adapter for `provider`
///
/// # Errors
///
/// Returns [`BridgeError::UnsupportedProvider`] for providers without a chat
/// adapter, or an error if the HTTP client cannot be built
pub fn create_adapter(provider: ProviderType, config: AdapterConfig) -> Result<Box<dyn ChatAdapter>> {
    match provider {
        ProviderType::LmStudio => Ok(Box::new(lm_studio::LmStudioAdapter::new(config)?)),
        ProviderType::HuggingFace => Err(BridgeError::UnsupportedProvider {
            provider: provider.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_serialization() {
        let ok = CompletionResult::Success {
            content: "hi".into(),
            raw: json!({"id": "x"}),
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"content": "hi", "raw": {"id": "x"}})
        );

        let err = CompletionResult::failure(CompletionErrorKind::TimeoutError, "slow");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"error": "TIMEOUT_ERROR", "message": "slow"})
        );
    }

    #[test]
    fn test_result_accessors() {
        let err = CompletionResult::failure(CompletionErrorKind::ApiError, "500 - boom");
        assert!(!err.is_success());
        assert_eq!(err.content(), None);
        assert_eq!(err.error_kind(), Some(CompletionErrorKind::ApiError));
        assert_eq!(CompletionErrorKind::ApiError.to_string(), "API_ERROR");
    }

    #[test]
    fn test_factory() {
        let adapter = create_adapter(ProviderType::LmStudio, AdapterConfig::default()).unwrap();
        assert_eq!(adapter.provider(), ProviderType::LmStudio);
        assert_eq!(adapter.endpoint(), "http://localhost:1234/v1");

        let err = create_adapter(ProviderType::HuggingFace, AdapterConfig::default()).err();
        assert!(matches!(err, Some(BridgeError::UnsupportedProvider { .. })));
    }
}
