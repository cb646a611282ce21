use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wallet_registry::store::MemoryStore;
use wallet_registry::{app, AppState, Settings, WalletService};

/// Full router over a fresh in-process store.
pub fn test_app() -> Router {
    test_app_with(&Settings::memory())
}

pub fn test_app_with(settings: &Settings) -> Router {
    let service = WalletService::new(Arc::new(MemoryStore::new()));
    app(AppState::new(service), settings)
}

/// POST raw bytes, optionally announcing their length up front.
pub async fn post_raw(app: &Router, uri: &str, body: String, content_length: bool) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if content_length {
        builder = builder.header(header::CONTENT_LENGTH, body.len());
    }
    let response = app.clone().oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub fn address(n: u32) -> String {
    format!("0x{:040x}", n)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn create_wallet(app: &Router, address: &str, score: i64, is_active: bool) -> Value {
    let (status, body) = post(
        app,
        "/wallets",
        json!({ "address": address, "score": score, "is_active": is_active }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
