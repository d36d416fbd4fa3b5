// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token validation through the auth middleware.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fantasy_sports_api::db;
use fantasy_sports_api::middleware::auth::create_access_token;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use tower::ServiceExt;

mod common;
use common::{authed_request, body_json, create_test_app, register_and_login};

fn me_with_cookie(token: &str) -> Request<Body> {
    authed_request(
        "GET",
        "/api/v1/auth/users/me",
        &format!("access_token_cookie={}", token),
        Body::empty(),
    )
}

#[tokio::test]
async fn test_expired_session_token_rejected() {
    let (app, state) = create_test_app().await;
    let (user_id, _) = register_and_login(&app, "expired@example.com").await;
    let token = create_access_token(user_id, &state.config.secret_key, -10).unwrap();

    let response = app.oneshot(me_with_cookie(&token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_key_rejected() {
    let (app, _) = create_test_app().await;
    let (user_id, _) = register_and_login(&app, "forged@example.com").await;
    let token = create_access_token(user_id, b"some_other_signing_key", 10).unwrap();

    let response = app.oneshot(me_with_cookie(&token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_without_type_claim_rejected() {
    #[derive(Serialize)]
    struct BareClaims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let (app, state) = create_test_app().await;
    let (user_id, _) = register_and_login(&app, "bare@example.com").await;

    let now = fantasy_sports_api::time_utils::unix_now() as usize;
    let token = encode(
        &Header::new(Algorithm::HS256),
        &BareClaims {
            sub: user_id.to_string(),
            exp: now + 600,
            iat: now,
        },
        &EncodingKey::from_secret(&state.config.secret_key),
    )
    .unwrap();

    let response = app.oneshot(me_with_cookie(&token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_unknown_user_is_not_found() {
    let (app, state) = create_test_app().await;
    let token = create_access_token(9999, &state.config.secret_key, 10).unwrap();

    let response = app.oneshot(me_with_cookie(&token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["details"], "User not found");
}

#[tokio::test]
async fn test_inactive_user_rejected() {
    let (app, state) = create_test_app().await;
    let (user_id, cookie) = register_and_login(&app, "benched@example.com").await;

    db::users::set_active(state.db.pool(), user_id, false)
        .await
        .unwrap();

    let response = app
        .oneshot(authed_request(
            "GET",
            "/api/v1/auth/users/me",
            &cookie,
            Body::empty(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "inactive_user");
}

#[tokio::test]
async fn test_cookie_takes_precedence_over_bearer() {
    let (app, _) = create_test_app().await;
    let (user_id, cookie) = register_and_login(&app, "cookie@example.com").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/auth/users/me")
                .header(header::COOKIE, cookie)
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], user_id);
}
