// tests/http_api_test.rs
// Router-level tests: admin ingestion, webhook dispatch, health

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use contentbot::{
    AppState, EngineConfig,
    api::http_router,
    generator::{ContentGenerator, FnGenerator},
    store::{DurableStore, MemoryStore},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;

const ADMIN_KEY: &str = "test-admin-key";

async fn test_app() -> (Router, Arc<AppState>) {
    let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
    let counter = AtomicU32::new(0);
    let generator: Arc<dyn ContentGenerator> = Arc::new(FnGenerator::new("counter", move || {
        Ok(format!("joke {}", counter.fetch_add(1, Ordering::SeqCst)))
    }));

    let state = Arc::new(
        AppState::assemble(EngineConfig::default(), store, false, generator, ADMIN_KEY)
            .await
            .expect("assemble state"),
    );
    (http_router(state.clone()), state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_root_reports_running() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Bot is running!");
}

#[tokio::test]
async fn test_upload_requires_admin_key() {
    let (app, state) = test_app().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/upload", json!({"url": "https://img/a.png", "key": "wrong"})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid admin key.");
    assert!(state.rotator.is_empty().await);
}

#[tokio::test]
async fn test_upload_then_webhook_next_rotates() {
    let (app, _) = test_app().await;

    for url in ["https://img/a.png", "https://img/b.png"] {
        let (status, body) = send(
            &app,
            json_request("POST", "/upload", json!({"url": url, "key": ADMIN_KEY})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Meme added successfully!");
    }

    let mut photos = Vec::new();
    for _ in 0..3 {
        let (status, body) = send(
            &app,
            json_request("POST", "/webhook", json!({"user_id": "42", "text": "next"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        photos.push(body["reply"]["photo_url"].as_str().unwrap().to_string());
    }

    assert_eq!(photos, vec!["https://img/a.png", "https://img/b.png", "https://img/a.png"]);
}

#[tokio::test]
async fn test_webhook_empty_pool_message() {
    let (app, _) = test_app().await;
    let (status, body) = send(
        &app,
        json_request("POST", "/webhook", json!({"user_id": "42", "text": "next"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"]["text"], "😢 No memes found. Admin will upload soon!");
}

#[tokio::test]
async fn test_webhook_ignores_chatter() {
    let (app, _) = test_app().await;
    let (status, body) = send(
        &app,
        json_request("POST", "/webhook", json!({"user_id": "42", "text": "hi bot"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].is_null());
}

#[tokio::test]
async fn test_webhook_jokes_do_not_repeat() {
    let (app, state) = test_app().await;

    let (_, start) = send(
        &app,
        json_request("POST", "/webhook", json!({"user_id": "7", "text": "/start"})),
    )
    .await;
    assert!(start["reply"]["text"].as_str().unwrap().contains("joke 0"));
    assert_eq!(start["reply"]["buttons"][0]["callback_data"], "another_joke");

    let (_, next) = send(
        &app,
        json_request("POST", "/webhook", json!({"user_id": "7", "text": "another_joke"})),
    )
    .await;
    assert_eq!(next["reply"]["text"], "joke 1");

    assert_eq!(state.users.list().await.unwrap(), vec!["7"]);
}

#[tokio::test]
async fn test_admin_listing_and_removal() {
    let (app, state) = test_app().await;
    let item = state.rotator.insert("https://img/a.png").await.unwrap();

    let list = Request::builder()
        .uri("/memes")
        .header("x-admin-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, list).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let unauthorized = Request::builder()
        .method("DELETE")
        .uri(format!("/memes/{}", item.id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, unauthorized).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let delete = |id: u64| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/memes/{}", id))
            .header("x-admin-key", ADMIN_KEY)
            .body(Body::empty())
            .unwrap()
    };
    let (status, body) = send(&app, delete(item.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"], "https://img/a.png");

    let (status, _) = send(&app, delete(item.id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_pool_size() {
    let (app, state) = test_app().await;
    state.rotator.insert("https://img/a.png").await.unwrap();

    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["pool_size"], 1);
    assert_eq!(body["retry_budget"], 20);
}

#[tokio::test]
async fn test_admin_can_clear_joke_history() {
    let (app, state) = test_app().await;
    send(
        &app,
        json_request("POST", "/webhook", json!({"user_id": "7", "text": "/joke"})),
    )
    .await;
    assert_eq!(state.fetcher.seen_count("7").await.unwrap(), 1);

    let forget = |key: &str| {
        Request::builder()
            .method("DELETE")
            .uri("/users/7/seen")
            .header("x-admin-key", key)
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(&app, forget("wrong")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(state.fetcher.seen_count("7").await.unwrap(), 1);

    let (status, body) = send(&app, forget(ADMIN_KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(state.fetcher.seen_count("7").await.unwrap(), 0);
}
