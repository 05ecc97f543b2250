// src/api/http/handlers.rs
// Liveness and health endpoints

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;

/// Plain-text liveness probe
pub async fn root_handler() -> &'static str {
    "Bot is running!"
}

/// Health check handler
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": app_state.store.name(),
        "pool_size": app_state.rotator.len().await,
        "retry_budget": app_state.fetcher.retry_budget(),
        "timestamp": Utc::now().to_rfc3339()
    }))
}
