// src/api/http/webhook.rs
// Inbound user messages from the messaging platform

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ApiResult, validation_error};
use crate::bot::Reply;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    pub user_id: String,
    /// Message text or button callback data
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// `None` when the message is not a command
    pub reply: Option<Reply>,
}

/// POST /webhook
pub async fn webhook_handler(
    State(app): State<Arc<AppState>>,
    Json(msg): Json<WebhookMessage>,
) -> ApiResult<impl IntoResponse> {
    if msg.user_id.trim().is_empty() {
        return Err(validation_error("user_id", "must not be empty"));
    }

    let reply = app.commands.handle(msg.user_id.trim(), &msg.text).await;
    Ok(Json(WebhookResponse { reply }))
}
