//! LM Studio chat adapter
//!
//! LM Studio serves an OpenAI-compatible API under `/v1`, but rejects `system`
//! and tool roles. Conversations are folded with
//! [`normalize_messages`](crate::messages::normalize_messages) before sending.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    config::{is_real_credential, AdapterConfig, ProviderType},
    error::{BridgeError, Result},
    messages::{normalize_messages, Message, WireMessage},
};

use super::{reasoning::strip_reasoning, ChatAdapter, CompletionErrorKind, CompletionResult};

/// LM Studio API adapter
pub struct LmStudioAdapter {
    client: Client,
    config: AdapterConfig,
    base_url: String,
    auth: Option<header::HeaderValue>,
}

impl LmStudioAdapter {
    /// Create a new adapter; the endpoint is normalized here and never changes
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cannot be used as a header value or
    /// the HTTP client cannot be built
    pub fn new(config: AdapterConfig) -> Result<Self> {
        let segment = ProviderType::LmStudio.api_path_segment().unwrap_or("/v1");
        let base_url = normalize_endpoint(&config.endpoint, segment);
        let auth = bearer(&config.api_key)?;

        let client = Client::builder()
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            config,
            base_url,
            auth,
        })
    }

    /// Build the request body for a conversation
    fn build_request(&self, messages: &[Message], max_tokens: Option<u32>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.effective_model().to_string(),
            messages: normalize_messages(messages, &self.config.greeting),
            temperature: self.config.temperature,
            max_tokens: max_tokens
                .filter(|&n| n > 0)
                .unwrap_or(self.config.max_tokens),
            top_p: self.config.top_p,
            frequency_penalty: self.config.frequency_penalty,
            presence_penalty: self.config.presence_penalty,
            n: self.config.result_count,
            stream: false,
        }
    }

    fn with_auth(request: RequestBuilder, auth: Option<&header::HeaderValue>) -> RequestBuilder {
        match auth {
            Some(value) => request.header(header::AUTHORIZATION, value.clone()),
            None => request,
        }
    }

    fn transport_failure(&self, err: &reqwest::Error) -> CompletionResult {
        let kind = classify(err);
        let message = match kind {
            CompletionErrorKind::ConnectionError => {
                format!("could not connect to LM Studio at {}: {err}", self.base_url)
            }
            CompletionErrorKind::TimeoutError => {
                format!("request to LM Studio timed out: {err}")
            }
            _ => format!("unexpected error from LM Studio: {err}"),
        };
        error!(error_kind = %kind, "{message}");
        CompletionResult::failure(kind, message)
    }
}

#[async_trait]
impl ChatAdapter for LmStudioAdapter {
    fn provider(&self) -> ProviderType {
        ProviderType::LmStudio
    }

    fn model(&self) -> &str {
        self.config.effective_model()
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn complete(&self, messages: &[Message], max_tokens: Option<u32>) -> CompletionResult {
        let request = self.build_request(messages, max_tokens);
        let url = format!("{}/chat/completions", self.base_url);

        info!(%url, model = %request.model, messages = request.messages.len(), "sending chat completion");
        if let Ok(body) = serde_json::to_string_pretty(&request) {
            debug!("request body: {body}");
        }

        let response = match Self::with_auth(self.client.post(&url), self.auth.as_ref())
            .json(&request)
            .timeout(self.config.completion_timeout())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return self.transport_failure(&err),
        };

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => return self.transport_failure(&err),
            };
            let message = format!("{} - {}", status.as_u16(), body);
            error!("LM Studio API error: {message}");
            return CompletionResult::failure(CompletionErrorKind::ApiError, message);
        }

        let raw: serde_json::Value = match response.json().await {
            Ok(raw) => raw,
            Err(err) => return self.transport_failure(&err),
        };

        let content = serde_json::from_value::<ChatCompletionResponse>(raw.clone())
            .ok()
            .and_then(|parsed| parsed.choices.into_iter().next())
            .and_then(|choice| choice.message.content);

        match content {
            Some(content) => {
                let answer = strip_reasoning(&content);
                if answer.len() != content.len() {
                    debug!("dropped reasoning block ({} bytes)", content.len() - answer.len());
                }
                info!(chars = answer.len(), "LM Studio response received");
                CompletionResult::Success {
                    content: answer.to_string(),
                    raw,
                }
            }
            None => {
                let message = "unexpected error from LM Studio: response has no choices[0].message.content";
                error!("{message}");
                CompletionResult::failure(CompletionErrorKind::UnexpectedError, message)
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        let fallback = || vec![self.config.effective_model().to_string()];
        let url = format!("{}/models", self.base_url);

        let response = match Self::with_auth(self.client.get(&url), self.auth.as_ref())
            .timeout(self.config.listing_timeout())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!("error fetching models from LM Studio: {err}");
                return fallback();
            }
        };

        if !response.status().is_success() {
            error!("failed to fetch models from LM Studio: {}", response.status());
            return fallback();
        }

        match response.json::<ModelList>().await {
            Ok(list) => list.data.into_iter().map(|m| m.id).collect(),
            Err(err) => {
                error!("unreadable model list from LM Studio: {err}");
                fallback()
            }
        }
    }

    async fn check_reachable(&self, credential: Option<&str>) -> bool {
        let credential = credential
            .filter(|c| !c.is_empty())
            .unwrap_or(self.config.api_key.as_str());
        let auth = match bearer(credential) {
            Ok(auth) => auth,
            Err(err) => {
                warn!("cannot use credential for LM Studio probe: {err}");
                return false;
            }
        };

        let url = format!("{}/models", self.base_url);
        match Self::with_auth(self.client.get(&url), auth.as_ref())
            .timeout(self.config.probe_timeout())
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                error!("error verifying LM Studio access: {err}");
                false
            }
        }
    }
}

/// Normalize a base URL: add `http://` if no scheme, then the API `segment`.
///
/// `host`, `http://host`, `http://host/` and `http://host/v1` all become
/// `http://host/v1`.
#[must_use]
pub fn normalize_endpoint(raw: &str, segment: &str) -> String {
    let raw = raw.trim();
    let mut url = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    if !url.ends_with(segment) {
        if url.ends_with('/') {
            url.push_str(segment.trim_start_matches('/'));
        } else {
            url.push_str(segment);
        }
    }
    url
}

fn bearer(credential: &str) -> Result<Option<header::HeaderValue>> {
    if !is_real_credential(credential) {
        return Ok(None);
    }
    let mut value = header::HeaderValue::from_str(&format!("Bearer {credential}"))
        .map_err(|_| BridgeError::ConfigValidation("Invalid API key format".to_string()))?;
    value.set_sensitive(true);
    Ok(Some(value))
}

fn classify(err: &reqwest::Error) -> CompletionErrorKind {
    if err.is_timeout() {
        CompletionErrorKind::TimeoutError
    } else if err.is_connect() {
        CompletionErrorKind::ConnectionError
    } else {
        CompletionErrorKind::UnexpectedError
    }
}

// LM Studio API types

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    n: u32,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelEntry {
    id: String,
}
