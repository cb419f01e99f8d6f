//! Router-level authentication and authorization tests.
//!
//! Accounts live in an in-process credential store, so none of these touch
//! PostgreSQL.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use pantry_core::auth::{MemoryCredentialStore, Role, TokenService};
use serde_json::json;

use common::{TEST_SECRET, lazy_state, register_and_login, send, send_raw};

fn app_with_store() -> (axum::Router, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let app = pantry_api::router(lazy_state(store.clone()));
    (app, store)
}

#[tokio::test]
async fn register_returns_account_without_token() {
    let (app, _) = app_with_store();

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": "alice", "password": "pw" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert!(body["id"].is_i64());
    assert!(body["token"].is_null());
}

#[tokio::test]
async fn second_registration_conflicts() {
    let (app, _) = app_with_store();
    let creds = json!({ "username": "alice", "password": "pw" });

    send(&app, "POST", "/api/users/register", None, Some(creds.clone())).await;
    let (status, body) = send(&app, "POST", "/api/users/register", None, Some(creds)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn blank_registration_is_rejected() {
    let (app, _) = app_with_store();
    let (status, body) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": "  ", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_token_opens_protected_routes() {
    let (app, _) = app_with_store();
    let token = register_and_login(&app, "alice", "pw").await;

    let (status, body) = send(&app, "GET", "/api/users/validate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    let (status, body) = send(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "USER");

    let (status, body) = send(&app, "GET", "/api/users/validate", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _) = app_with_store();
    register_and_login(&app, "alice", "pw").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "username": "alice", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn bad_tokens_fall_back_to_anonymous() {
    let (app, _) = app_with_store();
    register_and_login(&app, "alice", "pw").await;

    // Public routes still work with a junk token attached.
    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        Some("not-a-jwt"),
        Some(json!({ "username": "alice", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, garbage) = send(&app, "GET", "/api/users/me", Some("not-a-jwt"), None).await;
    let (_, missing) = send(&app, "GET", "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage, missing);
}

#[tokio::test]
async fn expired_and_foreign_tokens_are_unauthorized() {
    let (app, _) = app_with_store();
    register_and_login(&app, "alice", "pw").await;

    let ours = TokenService::with_default_ttl(TEST_SECRET.as_bytes());
    let expired = ours
        .issue_at("alice", Role::User, Utc::now() - Duration::hours(2))
        .unwrap();
    let (status, _) = send(&app, "GET", "/api/users/me", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = TokenService::with_default_ttl(b"someone-else")
        .issue("alice", Role::User)
        .unwrap();
    let (status, _) = send(&app, "GET", "/api/users/me", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_anonymous_and_plain_users() {
    let (app, _) = app_with_store();
    let token = register_and_login(&app, "alice", "pw").await;

    let (status, _) = send(&app, "GET", "/api/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "DELETE", "/api/admin/users/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_list_and_delete_users() {
    let (app, store) = app_with_store();
    let alice = register_and_login(&app, "alice", "pw").await;
    pantry_core::seed::ensure_admin(store.as_ref(), "root", "rootpw")
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({ "username": "alice", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({ "username": "root", "password": "rootpw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let admin = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "GET", "/api/admin/validate", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    let alice_id = users
        .iter()
        .find(|u| u["username"] == "alice")
        .map(|u| u["id"].as_i64().unwrap())
        .unwrap();

    let uri = format!("/api/admin/users/{alice_id}");
    let (status, _) = send(&app, "DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The deleted account's token no longer resolves to anyone.
    let (status, _) = send(&app, "GET", "/api/users/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profiles_and_user_listing() {
    let (app, _) = app_with_store();
    let token = register_and_login(&app, "alice", "pw").await;
    register_and_login(&app, "bob", "pw").await;

    let (status, body) = send(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert!(body[0].get("role").is_none());

    let bob_id = body
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "bob")
        .map(|u| u["id"].as_i64().unwrap())
        .unwrap();
    let (status, body) = send(&app, "GET", &format!("/api/users/{bob_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "bob");

    let (status, _) = send(&app, "GET", "/api/users/9999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_routes_require_authentication() {
    let (app, _) = app_with_store();
    let (status, _) = send(&app, "GET", "/api/nothing-here", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_field_gets_json_validation_error() {
    let (app, _) = app_with_store();
    let (status, body) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Malformed request body" }));
}

#[tokio::test]
async fn unparsable_json_gets_json_validation_error() {
    let (app, _) = app_with_store();
    let (status, content_type, body) =
        send_raw(&app, "POST", "/api/users/login", "{alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(content_type.starts_with("application/json"));
    assert_eq!(body["error"], "Malformed request body");
}

#[tokio::test]
async fn non_numeric_path_id_is_a_validation_error() {
    let (app, _) = app_with_store();
    let token = register_and_login(&app, "alice", "pw").await;

    let (status, body) = send(&app, "GET", "/api/users/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid path parameter" }));
}

#[tokio::test]
async fn unsupported_method_and_unknown_path_have_json_bodies() {
    let (app, _) = app_with_store();
    let token = register_and_login(&app, "alice", "pw").await;

    let (status, body) = send(&app, "PUT", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "GET", "/api/nothing-here", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn profile_update_round_trips_bio() {
    let (app, _) = app_with_store();
    let token = register_and_login(&app, "alice", "pw").await;

    let (status, me) = send(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["bio"], "");
    let id = me["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({ "username": "alice", "bio": "Bakes bread" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "Bakes bread");

    let (_, me) = send(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(me["bio"], "Bakes bread");
    let (_, profile) = send(&app, "GET", &format!("/api/users/{id}"), Some(&token), None).await;
    assert_eq!(profile["bio"], "Bakes bread");
}

#[tokio::test]
async fn profile_rename_conflicts_and_ends_old_tokens() {
    let (app, _) = app_with_store();
    let token = register_and_login(&app, "alice", "pw").await;
    register_and_login(&app, "bob", "pw").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({ "username": "bob", "bio": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({ "username": "alicia" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alicia");

    let (status, _) = send(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let renamed = {
        let (status, body) = send(
            &app,
            "POST",
            "/api/users/login",
            None,
            Some(json!({ "username": "alicia", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    };
    let (status, _) = send(&app, "GET", "/api/users/me", Some(&renamed), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn oversized_token_lifetime_does_not_panic() {
    let store: Arc<MemoryCredentialStore> = Arc::new(MemoryCredentialStore::new());
    let mut state = lazy_state(store.clone());
    state.config.token_ttl_secs = i64::MAX;
    let state = pantry_api::AppState::with_accounts(state.pool, state.config, store);
    let app = pantry_api::router(state);

    let token = register_and_login(&app, "alice", "pw").await;
    let (status, _) = send(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}
