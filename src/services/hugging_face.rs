//! Hugging Face inference endpoint verification

use std::time::Duration;

use reqwest::{header, Client};
use serde_json::json;
use tracing::info;

use crate::{
    config::is_real_credential,
    error::{BridgeError, Result},
};

/// A deployed Hugging Face inference endpoint
pub struct HuggingFaceEndpoint {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl HuggingFaceEndpoint {
    /// Create a client for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is empty or the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into().trim().to_string();
        if endpoint.is_empty() {
            return Err(BridgeError::InvalidInput(
                "Hugging Face endpoint is required".to_string(),
            ));
        }
        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Override the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a probe input and return whatever JSON the endpoint answers with.
    ///
    /// Non-success statuses are not errors here; the body (usually
    /// `{"error": ...}`) is returned for the caller to show.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON
    pub async fn verify(&self) -> Result<serde_json::Value> {
        info!(endpoint = %self.endpoint, "verifying Hugging Face endpoint");

        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&json!({"inputs": "validating end_point"}));
        if is_real_credential(&self.api_key) {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", self.api_key));
        }

        let response = request.send().await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, header as header_eq, method},
        Mock, MockServer, ResponseTemplate,
    };

    #[test]
    fn test_empty_endpoint_rejected() {
        assert!(matches!(
            HuggingFaceEndpoint::new("hf_x", "  "),
            Err(BridgeError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_eq("authorization", "Bearer hf_token"))
            .and(body_json(json!({"inputs": "validating end_point"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "ok"}])),
            )
            .mount(&server)
            .await;

        let result = HuggingFaceEndpoint::new("hf_token", server.uri())
            .unwrap()
            .verify()
            .await
            .unwrap();
        assert_eq!(result, json!([{"generated_text": "ok"}]));
    }

    #[tokio::test]
    async fn test_verify_error_status_still_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "loading"})))
            .mount(&server)
            .await;

        let result = HuggingFaceEndpoint::new("hf_token", server.uri())
            .unwrap()
            .verify()
            .await
            .unwrap();
        assert_eq!(result["error"], "loading");
    }

    #[tokio::test]
    async fn test_verify_non_json_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let result = HuggingFaceEndpoint::new("hf_token", server.uri())
            .unwrap()
            .verify()
            .await;
        assert!(matches!(result, Err(BridgeError::Http(_))));
    }
}
