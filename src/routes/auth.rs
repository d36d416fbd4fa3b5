// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local account routes: registration, cookie login/logout, current user.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::config::{Config, SESSION_COOKIE_NAME};
use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_access_token, CurrentUser};
use crate::models::UserPublic;
use crate::services::password::{hash_password, verify_password};
use crate::AppState;

/// Routes reachable without a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Routes that need `require_auth`.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/users/me", get(me))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// OAuth2-style password form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<(StatusCode, Json<UserPublic>)> {
    form.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let email = form.email.trim();
    if db::users::get_by_email(state.db.pool(), email).await?.is_some() {
        return Err(AppError::Conflict(db::users::EMAIL_TAKEN.to_string()));
    }

    let password = form.password.clone();
    let hashed = blocking(move || hash_password(&password)).await??;
    let full_name = form
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let user = db::users::create(state.db.pool(), email, &hashed, full_name).await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(UserPublic::from(&user))))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Json<UserPublic>)> {
    let user = db::users::get_by_email(state.db.pool(), form.username.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let encoded = user.hashed_password.clone();
    if !blocking(move || verify_password(&form.password, &encoded)).await? {
        return Err(AppError::InvalidCredentials);
    }

    if !user.is_active {
        return Err(AppError::InactiveUser);
    }

    let token = create_access_token(
        user.id,
        &state.config.secret_key,
        state.config.access_token_expire_minutes,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok((
        jar.add(session_cookie(&state.config, token)),
        Json(UserPublic::from(&user)),
    ))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(expired_session_cookie(&state.config)),
        Json(MessageResponse {
            message: "Successfully logged out",
        }),
    )
}

async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserPublic> {
    Json(UserPublic::from(&user))
}

/// Run PBKDF2 off the async worker threads.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password task failed: {}", e)))
}

/// Session cookie carrying the JWT. Removal must use the same attributes.
fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::minutes(config.access_token_expire_minutes))
        .build()
}

fn expired_session_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::ZERO)
        .build()
}
