//! HTTP surface built on axum.
//!
//! Routes:
//! - GET  /verify_end_point
//! - POST /store_lm_studio
//! - GET  /get_api_key
//! - GET  /get_api_keys
//! - GET  /fetch_models

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::{
    config::{AdapterConfig, ServerSettings},
    error::Result,
    store::ConfigStore,
    validator::EndpointValidator,
};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Credential and model registry.
    pub store: Arc<dyn ConfigStore>,
    /// Validator used by `/verify_end_point`.
    pub validator: EndpointValidator,
    /// Base adapter settings for endpoints configured through the API.
    pub defaults: AdapterConfig,
    /// Scope all stored data is filed under.
    pub scope: String,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>, defaults: AdapterConfig, scope: impl Into<String>) -> Self {
        Self {
            store,
            validator: EndpointValidator::new(defaults.clone()),
            defaults,
            scope: scope.into(),
        }
    }
}

/// Build the router with all routes attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/verify_end_point", get(handlers::verify_end_point))
        .route("/store_lm_studio", post(handlers::store_lm_studio))
        .route("/get_api_key", get(handlers::get_api_key))
        .route("/get_api_keys", get(handlers::get_api_keys))
        .route("/fetch_models", get(handlers::fetch_models))
        .with_state(state)
}

/// Bind `host:port` and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn serve(settings: &ServerSettings, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("lm-bridge listening on {addr}");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
