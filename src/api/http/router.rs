// src/api/http/router.rs
// HTTP router composition

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{
    admin::{
        delete_meme_handler, forget_seen_handler, list_memes_handler, list_users_handler,
        upload_handler,
    },
    handlers::{health_handler, root_handler},
    webhook::webhook_handler,
};
use crate::state::AppState;

pub fn http_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/", get(root_handler))
        .route("/health", get(health_handler))

        // Admin
        .route("/upload", post(upload_handler))
        .route("/memes", get(list_memes_handler))
        .route("/memes/{id}", delete(delete_meme_handler))
        .route("/users", get(list_users_handler))
        .route("/users/{id}/seen", delete(forget_seen_handler))

        // Messaging platform
        .route("/webhook", post(webhook_handler))

        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
