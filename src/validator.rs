//! Endpoint validation across providers
//!
//! [`EndpointValidator::validate`] picks the provider's check and wraps the
//! outcome in a [`Verdict`]. It never returns an error; failures are reported
//! inside the verdict.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    config::{AdapterConfig, ProviderType},
    error::Result,
    services::{hugging_face::HuggingFaceEndpoint, lm_studio::LmStudioAdapter, ChatAdapter},
};

/// Uniform pass/fail report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Verdict {
    #[must_use]
    pub fn passed(result: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Dispatches `(credential, endpoint, provider)` to the matching check
#[derive(Debug, Clone, Default)]
pub struct EndpointValidator {
    defaults: AdapterConfig,
}

impl EndpointValidator {
    /// `defaults` supplies timeouts and sampling settings for adapters built here
    #[must_use]
    pub fn new(defaults: AdapterConfig) -> Self {
        Self { defaults }
    }

    /// Check that `endpoint` is usable for `provider_name`
    pub async fn validate(&self, credential: &str, endpoint: &str, provider_name: &str) -> Verdict {
        match self.dispatch(credential, endpoint, provider_name).await {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!(provider = provider_name, "endpoint validation failed: {err}");
                Verdict::failed(err.to_string())
            }
        }
    }

    async fn dispatch(&self, credential: &str, endpoint: &str, provider_name: &str) -> Result<Verdict> {
        let provider: ProviderType = provider_name.parse()?;
        info!(%provider, endpoint, "validating endpoint");

        match provider {
            ProviderType::LmStudio => {
                let config = AdapterConfig {
                    endpoint: endpoint.to_string(),
                    api_key: credential.to_string(),
                    ..self.defaults.clone()
                };
                let adapter = LmStudioAdapter::new(config)?;
                if adapter.check_reachable(None).await {
                    Ok(Verdict::passed(json!({
                        "status": "connected",
                        "endpoint": endpoint,
                    })))
                } else {
                    Ok(Verdict::failed("connection failed"))
                }
            }
            ProviderType::HuggingFace => {
                let result = HuggingFaceEndpoint::new(credential, endpoint)?
                    .with_timeout(self.defaults.listing_timeout())
                    .verify()
                    .await?;
                Ok(Verdict::passed(result))
            }
        }
    }
}
