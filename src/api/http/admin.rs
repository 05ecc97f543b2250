// src/api/http/admin.rs
// Administrator endpoints, all gated on the shared admin key

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult, IntoApiError, validation_error};
use crate::rotation::ContentItem;
use crate::state::AppState;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub item: ContentItem,
}

fn authorize(app: &AppState, key: &str) -> ApiResult<()> {
    if app.is_admin(key) {
        Ok(())
    } else {
        warn!("Rejected admin request with invalid key");
        Err(ApiError::forbidden("Invalid admin key."))
    }
}

fn header_key(headers: &HeaderMap) -> &str {
    headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// POST /upload
pub async fn upload_handler(
    State(app): State<Arc<AppState>>,
    Json(req): Json<UploadRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&app, &req.key)?;

    let url = req.url.trim();
    if url.is_empty() {
        return Err(validation_error("url", "must not be empty"));
    }

    let item = app.rotator.insert(url).await?;
    info!(id = item.id, "Meme uploaded");

    Ok(Json(UploadResponse {
        success: true,
        message: "Meme added successfully!".to_string(),
        item,
    }))
}

/// GET /memes
pub async fn list_memes_handler(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    authorize(&app, header_key(&headers))?;
    Ok(Json(app.rotator.items().await))
}

/// DELETE /memes/{id}
pub async fn delete_meme_handler(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    authorize(&app, header_key(&headers))?;

    let removed = app
        .rotator
        .remove(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Meme {} not found", id)))?;

    Ok(Json(removed))
}

/// GET /users
pub async fn list_users_handler(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    authorize(&app, header_key(&headers))?;

    let users = app.users.list().await.into_api_error("Failed to list users")?;
    Ok(Json(users))
}

/// DELETE /users/{id}/seen
///
/// Wipes the user's joke history so old jokes may be served again.
pub async fn forget_seen_handler(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    authorize(&app, header_key(&headers))?;

    app.fetcher.forget(&user_id).await?;
    info!(user_id = %user_id, "Seen history cleared");
    Ok(Json(serde_json::json!({ "success": true, "user_id": user_id })))
}
