// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use fantasy_sports_api::config::{Config, SESSION_COOKIE_NAME};
use fantasy_sports_api::db::{self, Database};
use fantasy_sports_api::models::{Position, ValueFormat, YahooTokens};
use fantasy_sports_api::routes::create_router;
use fantasy_sports_api::services::TokenCipher;
use fantasy_sports_api::time_utils::unix_now;
use fantasy_sports_api::AppState;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "hunter2hunter2";

/// Create a test app over a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default()).await
}

/// Like [`create_test_app`], for tests that point upstream URLs at a mock
/// server.
#[allow(dead_code)]
pub async fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let db = Database::in_memory()
        .await
        .expect("Failed to open in-memory database");
    let state = Arc::new(AppState::new(config, db).expect("Failed to build app state"));
    (create_router(state.clone()), state)
}

/// URL-encode a form body.
#[allow(dead_code)]
pub fn form_body(fields: &[(&str, &str)]) -> Body {
    let encoded = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    Body::from(encoded)
}

#[allow(dead_code)]
pub fn form_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(form_body(fields))
        .unwrap()
}

/// Build a request carrying the session cookie.
#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, cookie: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract `name=value` of the session cookie from a login response.
#[allow(dead_code)]
pub fn session_cookie_from(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", SESSION_COOKIE_NAME)))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Register an account through the API and log in.
/// Returns the user id and a `Cookie` header value.
#[allow(dead_code)]
pub async fn register_and_login(app: &axum::Router, email: &str) -> (i64, String) {
    let response = app
        .clone()
        .oneshot(form_request(
            "/api/v1/auth/register",
            &[("email", email), ("password", TEST_PASSWORD)],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let user_id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(form_request(
            "/api/v1/auth/login",
            &[("username", email), ("password", TEST_PASSWORD)],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie_from(&response).expect("login should set the session cookie");

    (user_id, cookie)
}

/// Store encrypted Yahoo tokens for a user, as a completed OAuth flow would.
#[allow(dead_code)]
pub async fn link_yahoo(
    state: &AppState,
    user_id: i64,
    access_token: &str,
    refresh_token: &str,
    expires_in: i64,
) {
    let cipher = TokenCipher::new(&state.config.secret_key).unwrap();
    let (access, refresh) = cipher
        .encrypt_pair(access_token, refresh_token, user_id)
        .unwrap();
    db::tokens::upsert(
        state.db.pool(),
        &YahooTokens {
            user_id,
            access_token_encrypted: access,
            refresh_token_encrypted: refresh,
            token_type: "bearer".to_string(),
            expires_at: unix_now() + expires_in,
        },
    )
    .await
    .unwrap();
}

/// Insert a player with a value in `format`. Returns the player id.
#[allow(dead_code)]
pub async fn seed_player(
    state: &AppState,
    name: &str,
    position: Position,
    format: ValueFormat,
    value: i64,
) -> i64 {
    let id = db::players::insert(state.db.pool(), name, position, Some("KC"))
        .await
        .unwrap();
    db::players::insert_value(
        state.db.pool(),
        id,
        value,
        format,
        "FantasyCalc",
        chrono::Utc::now(),
    )
    .await
    .unwrap();
    id
}
