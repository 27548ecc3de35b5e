//! HTTP surface.

use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::State,
        http::HeaderMap,
        routing::{get, post},
    },
    serde_json::json,
    tokio::net::TcpListener,
    tracing::info,
};

use websteer_common::InvocationId;
use websteer_config::ServerConfig;

use crate::{
    error::GatewayError,
    perform::PerformService,
    request::AutomationRequest,
    response::AutomationResponse,
};

const INVOCATION_HEADER: &str = "x-invocation-id";

pub fn router(service: Arc<PerformService>) -> Router {
    Router::new()
        .route("/v1/perform", post(perform))
        .route("/health", get(health))
        .with_state(service)
}

async fn perform(
    State(service): State<Arc<PerformService>>,
    headers: HeaderMap,
    Json(request): Json<AutomationRequest>,
) -> Result<Json<AutomationResponse>, GatewayError> {
    let invocation_id = headers
        .get(INVOCATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(InvocationId::from)
        .unwrap_or_else(InvocationId::generate);
    let response = service.perform(invocation_id, request).await?;
    Ok(Json(response))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn serve(cfg: &ServerConfig, service: Arc<PerformService>) -> std::io::Result<()> {
    let listener = TcpListener::bind((cfg.bind.as_str(), cfg.port)).await?;
    info!(bind = %cfg.bind, port = cfg.port, "listening");
    axum::serve(listener, router(service)).await
}
