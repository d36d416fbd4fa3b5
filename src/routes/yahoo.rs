// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Yahoo account linking and Fantasy API proxy routes.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::auth::CurrentUser;
use crate::models::yahoo::{AuthUrlResponse, YahooLeaguesResponse, YahooLinkStatus};
use crate::models::{PlayerStatus, TeamRoster, WaiverPlayer};
use crate::time_utils::unix_now;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// How long a signed OAuth state stays valid.
const STATE_MAX_AGE_SECS: i64 = 15 * 60;

/// The OAuth callback: Yahoo redirects the browser here, so it cannot rely on
/// the session and authenticates through the signed state instead.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/yahoo/callback", get(auth_callback))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/yahoo/auth", get(auth_start).delete(unlink))
        .route("/yahoo/status", get(link_status))
        .route("/yahoo/leagues", get(leagues))
        .route("/yahoo/leagues/{league_key}/waiver-wire", get(waiver_wire))
        .route("/yahoo/leagues/{league_key}/roster", get(roster))
}

// ─── OAuth state ─────────────────────────────────────────────────────────────

/// Sign `user_id|timestamp_hex` and base64url-encode it with the signature.
pub fn create_oauth_state(user_id: i64, issued_at: i64, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", user_id, issued_at);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Verify an OAuth state and return the user id it was issued for.
///
/// Fails on a bad encoding, a bad signature, or a state older than
/// fifteen minutes (or from the future).
pub fn verify_oauth_state(state: &str, secret: &[u8], now: i64) -> Option<i64> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "user_id|timestamp_hex|signature_hex"
    let mut parts = state_str.splitn(3, '|');
    let (user_id, timestamp_hex, signature_hex) = (parts.next()?, parts.next()?, parts.next()?);

    let signature = hex::decode(signature_hex).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(format!("{}|{}", user_id, timestamp_hex).as_bytes());

    let expected = mac.finalize().into_bytes();
    if !bool::from(expected.as_slice().ct_eq(&signature)) {
        tracing::warn!("OAuth state signature mismatch");
        return None;
    }

    let issued_at = i64::from_str_radix(timestamp_hex, 16).ok()?;
    let age = now - issued_at;
    if !(0..=STATE_MAX_AGE_SECS).contains(&age) {
        tracing::info!(age, "OAuth state expired");
        return None;
    }

    user_id.parse().ok()
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// Start OAuth flow - return the Yahoo authorization URL.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<AuthUrlResponse>> {
    let oauth_state = create_oauth_state(user.id, unix_now(), &state.config.secret_key)?;
    let authorization_url = state.yahoo_service.authorization_url(&oauth_state);

    tracing::info!(user_id = user.id, "Starting Yahoo OAuth flow");
    Ok(Json(AuthUrlResponse { authorization_url }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange the code, store tokens, return to the frontend.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let frontend_url = state.config.frontend_url.trim_end_matches('/');

    let user_id = params
        .state
        .as_deref()
        .and_then(|s| verify_oauth_state(s, &state.config.secret_key, unix_now()))
        .ok_or(AppError::InvalidToken)?;

    if let Some(error) = params.error {
        tracing::warn!(user_id, error = %error, "OAuth error from Yahoo");
        return Ok(Redirect::temporary(&format!(
            "{}/settings?error={}",
            frontend_url,
            urlencoding::encode(&error)
        )));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    // The state may outlive the account it was issued for.
    if db::users::get_by_id(state.db.pool(), user_id).await?.is_none() {
        return Err(AppError::InvalidToken);
    }

    state
        .yahoo_service
        .handle_oauth_callback(user_id, &code)
        .await?;

    Ok(Redirect::temporary(&format!("{}/leagues", frontend_url)))
}

async fn link_status(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<YahooLinkStatus>> {
    let is_linked = state.yahoo_service.is_linked(user.id).await?;
    Ok(Json(YahooLinkStatus { is_linked }))
}

async fn unlink(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<YahooLinkStatus>> {
    state.yahoo_service.unlink(user.id).await?;
    Ok(Json(YahooLinkStatus { is_linked: false }))
}

async fn leagues(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<YahooLeaguesResponse>> {
    let leagues = state.yahoo_service.leagues(user.id).await?;
    Ok(Json(YahooLeaguesResponse { leagues }))
}

#[derive(Debug, Deserialize)]
pub struct WaiverWireParams {
    #[serde(default)]
    status: Option<String>,
}

async fn waiver_wire(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(league_key): Path<String>,
    Query(params): Query<WaiverWireParams>,
) -> Result<Json<Vec<WaiverPlayer>>> {
    let status = match params.status.as_deref() {
        None | Some("") => PlayerStatus::default(),
        Some(raw) => raw
            .parse()
            .map_err(|e: crate::models::ParseEnumError| AppError::BadRequest(e.to_string()))?,
    };

    let players = state
        .yahoo_service
        .waiver_players(user.id, &league_key, status)
        .await?;
    Ok(Json(players))
}

async fn roster(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(league_key): Path<String>,
) -> Result<Json<TeamRoster>> {
    let roster = state.yahoo_service.roster(user.id, &league_key).await?;
    Ok(Json(roster))
}
