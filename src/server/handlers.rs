//! HTTP request handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    config::{AdapterConfig, ProviderType},
    error::{BridgeError, Result},
    services::{lm_studio::LmStudioAdapter, ChatAdapter},
    store::{ConfigStore, ModelRecord},
};

use super::AppState;

/// Query for GET /verify_end_point.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyEndpointQuery {
    #[serde(default, alias = "model_api_key")]
    pub credential: String,
    #[serde(default, alias = "end_point")]
    pub endpoint: String,
    #[serde(default, alias = "model_provider")]
    pub provider_name: String,
}

/// Request body for POST /store_lm_studio.
#[derive(Debug, Deserialize)]
pub struct StoreLmStudioRequest {
    #[serde(alias = "api_key")]
    pub credential: String,
    pub endpoint: String,
}

/// Response body for POST /store_lm_studio.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreResponse {
    pub success: bool,
    pub message: String,
}

/// Query for GET /get_api_key.
#[derive(Debug, Deserialize)]
pub struct ApiKeyQuery {
    #[serde(alias = "model_provider")]
    pub provider_name: String,
}

/// A stored credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    pub provider: String,
    pub api_key: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

fn internal_error(err: &BridgeError) -> Response {
    error!("request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            detail: "Internal Server Error".to_string(),
        }),
    )
        .into_response()
}

/// GET /verify_end_point
///
/// Always 200; the verdict carries success or failure.
pub async fn verify_end_point(
    State(state): State<AppState>,
    Query(query): Query<VerifyEndpointQuery>,
) -> Response {
    let verdict = state
        .validator
        .validate(&query.credential, &query.endpoint, &query.provider_name)
        .await;
    Json(verdict).into_response()
}

/// POST /store_lm_studio
///
/// Saves the credential, then records every model the endpoint lists.
pub async fn store_lm_studio(
    State(state): State<AppState>,
    Json(body): Json<StoreLmStudioRequest>,
) -> Response {
    match configure_lm_studio(&state, &body).await {
        Ok(_) => Json(StoreResponse {
            success: true,
            message: "LM Studio configured successfully".to_string(),
        })
        .into_response(),
        Err(err) => internal_error(&err),
    }
}

/// Run a store write off the async workers; file-backed stores block on disk I/O.
async fn blocking_store<T, F>(store: Arc<dyn ConfigStore>, write: F) -> Result<T>
where
    F: FnOnce(&dyn ConfigStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || write(store.as_ref()))
        .await
        .map_err(|e| BridgeError::Store(format!("store task failed: {e}")))?
}

async fn configure_lm_studio(state: &AppState, body: &StoreLmStudioRequest) -> Result<usize> {
    let provider = ProviderType::LmStudio.display_name();
    let scope = state.scope.clone();
    let credential = body.credential.clone();
    blocking_store(state.store.clone(), move |store| {
        store.store_credential(&scope, provider, &credential)
    })
    .await?;

    let adapter = LmStudioAdapter::new(AdapterConfig {
        endpoint: body.endpoint.clone(),
        api_key: body.credential.clone(),
        ..state.defaults.clone()
    })?;
    let models = adapter.list_models().await;

    let scope = state.scope.clone();
    let end_point = adapter.endpoint().to_string();
    let token_limit = state.defaults.max_tokens;
    blocking_store(state.store.clone(), move |store| {
        store.store_models(&scope, provider, &end_point, &models, token_limit)
    })
    .await
}

/// GET /get_api_key
///
/// Returns `null` when no credential is stored.
pub async fn get_api_key(
    State(state): State<AppState>,
    Query(query): Query<ApiKeyQuery>,
) -> Json<Option<ApiKeyResponse>> {
    Json(
        state
            .store
            .fetch_credential(&state.scope, &query.provider_name)
            .map(|api_key| ApiKeyResponse {
                provider: query.provider_name.clone(),
                api_key,
            }),
    )
}

/// GET /get_api_keys
///
/// Every credential in the scope, keyed by provider name.
pub async fn get_api_keys(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    Json(state.store.fetch_credentials(&state.scope))
}

/// GET /fetch_models
pub async fn fetch_models(State(state): State<AppState>) -> Json<Vec<ModelRecord>> {
    Json(state.store.fetch_models(&state.scope))
}
