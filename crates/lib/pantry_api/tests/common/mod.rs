//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use pantry_api::{AppState, config::ApiConfig};
use pantry_core::auth::CredentialStore;
use pantry_core::models::recipe::UnknownTags;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "router-test-secret";

pub fn test_config(database_url: &str) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        pg_connection_url: database_url.into(),
        jwt_secret: TEST_SECRET.into(),
        token_ttl_secs: 3600,
        allowed_origins: vec![],
        unknown_tags: UnknownTags::Drop,
    }
}

/// State over `accounts` with a pool that never connects unless used.
pub fn lazy_state(accounts: Arc<dyn CredentialStore>) -> AppState {
    let url = "postgres://localhost:5432/pantry_test";
    let pool = PgPool::connect_lazy(url).expect("lazy pool");
    AppState::with_accounts(pool, test_config(url), accounts)
}

/// Send one request and return status plus parsed JSON (`Null` when empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let resp = app.clone().oneshot(request).await.expect("response");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, json)
}

/// Send a raw body as JSON; returns status, content type and parsed body.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: &str,
) -> (StatusCode, String, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");

    let resp = app.clone().oneshot(request).await.expect("response");
    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, content_type, json)
}

/// Register `username` then log in, returning the access token.
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let creds = serde_json::json!({ "username": username, "password": password });
    let (status, _) = send(app, "POST", "/api/users/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "register {username}");
    let (status, body) = send(app, "POST", "/api/users/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK, "login {username}");
    body["token"].as_str().expect("token").to_string()
}
