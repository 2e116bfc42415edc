//! Provider types and per-adapter connection profiles

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Credential value meaning "no authentication"
pub const NO_CREDENTIAL: &str = "EMPTY";

/// Providers the validator knows how to check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    #[serde(rename = "LM Studio")]
    LmStudio,
    #[serde(rename = "Hugging Face")]
    HuggingFace,
}

impl ProviderType {
    /// Human-readable provider name, also used as the storage key
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::LmStudio => "LM Studio",
            Self::HuggingFace => "Hugging Face",
        }
    }

    /// Get the default base URL for this provider
    #[must_use]
    pub const fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::LmStudio => Some("http://localhost:1234"),
            Self::HuggingFace => None, // inference endpoints are per-deployment
        }
    }

    /// Versioned API path segment appended to the base URL
    #[must_use]
    pub const fn api_path_segment(&self) -> Option<&'static str> {
        match self {
            Self::LmStudio => Some("/v1"),
            Self::HuggingFace => None,
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = BridgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "lmstudio" => Ok(Self::LmStudio),
            "huggingface" => Ok(Self::HuggingFace),
            _ => Err(BridgeError::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

/// Connection and sampling parameters for one chat adapter.
///
/// Every default is documented on its `default_*` function below. The struct is
/// deserialized from the `lm_studio` section of the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Base URL; normalized by the adapter at construction
    pub endpoint: String,

    /// Bearer credential; [`NO_CREDENTIAL`] or empty disables the header
    pub api_key: String,

    /// Model identifier; `None` sends [`AdapterConfig::placeholder_model`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Model name used when none is configured
    pub placeholder_model: String,

    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,

    /// Number of choices requested (`n` on the wire)
    pub result_count: u32,

    /// Content sent when a conversation normalizes to nothing
    pub greeting: String,

    pub completion_timeout_ms: u64,
    pub listing_timeout_ms: u64,
    pub probe_timeout_ms: u64,
}

fn default_endpoint() -> String {
    ProviderType::LmStudio
        .default_base_url()
        .unwrap_or("http://localhost:1234")
        .to_string()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: NO_CREDENTIAL.to_string(),
            model: None,
            placeholder_model: "local-model".to_string(),
            temperature: 0.6,
            max_tokens: 4032,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            result_count: 1,
            greeting: "Hello".to_string(),
            completion_timeout_ms: 60_000,
            listing_timeout_ms: 30_000,
            probe_timeout_ms: 10_000,
        }
    }
}

impl AdapterConfig {
    /// Config for `endpoint` with the given credential and defaults elsewhere
    #[must_use]
    pub fn for_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Model sent on the wire
    #[must_use]
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.placeholder_model)
    }

    #[must_use]
    pub const fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }

    #[must_use]
    pub const fn listing_timeout(&self) -> Duration {
        Duration::from_millis(self.listing_timeout_ms)
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Check sampling parameters and timeouts are in range
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigValidation`] naming the first bad field
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(BridgeError::ConfigValidation(format!(
                "temperature must be within 0..=2, got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(BridgeError::ConfigValidation(format!(
                "top_p must be within 0..=1, got {}",
                self.top_p
            )));
        }
        if self.result_count == 0 {
            return Err(BridgeError::ConfigValidation(
                "result_count must be at least 1".to_string(),
            ));
        }
        if self.completion_timeout_ms == 0
            || self.listing_timeout_ms == 0
            || self.probe_timeout_ms == 0
        {
            return Err(BridgeError::ConfigValidation(
                "timeouts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Whether `credential` should be sent as a bearer token
#[must_use]
pub fn is_real_credential(credential: &str) -> bool {
    !credential.is_empty() && credential != NO_CREDENTIAL
}
