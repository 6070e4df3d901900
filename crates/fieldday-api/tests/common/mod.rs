//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fieldday_authoring::application::event_store::KeyValueEventStore;
use fieldday_core::clock::Clock;
use fieldday_core::identity::EditorIdentity;
use fieldday_store::memory_key_value_store::MemoryKeyValueStore;
use fieldday_store::pg_key_value_store::PgKeyValueStore;
use fieldday_test_support::FixedClock;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fieldday_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

fn default_editor() -> EditorIdentity {
    EditorIdentity::new("organizer", "Organizer")
}

/// Build the full app router over a real `PgKeyValueStore`. Uses the same
/// route structure as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let event_store = KeyValueEventStore::new(Arc::new(PgKeyValueStore::new(pool)));
    fieldday_api::app(AppState::new(
        fixed_clock(),
        Arc::new(event_store),
        default_editor(),
        "postgres",
    ))
}

/// Build the full app router over a shared in-memory store.
pub fn build_memory_app(kv: Arc<MemoryKeyValueStore>) -> Router {
    let event_store = KeyValueEventStore::new(kv);
    fieldday_api::app(AppState::new(
        fixed_clock(),
        Arc::new(event_store),
        default_editor(),
        "memory",
    ))
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
