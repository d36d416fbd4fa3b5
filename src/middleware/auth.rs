// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::config::SESSION_COOKIE_NAME;
use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ACCESS_TOKEN_TYPE: &str = "access";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (local user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Token kind, always "access" for session tokens
    #[serde(rename = "type")]
    pub token_type: String,
}

/// Authenticated user loaded by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires valid JWT authentication.
///
/// Reads the session cookie, falling back to an `Authorization: Bearer`
/// header for API clients.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match jar.get(SESSION_COOKIE_NAME) {
        Some(cookie) => cookie.value().to_string(),
        None => request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
            .ok_or(AppError::Unauthorized)?,
    };

    let user_id = decode_access_token(&token, &state.config.secret_key)?;

    let user = crate::db::users::get_by_id(state.db.pool(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !user.is_active {
        return Err(AppError::InactiveUser);
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Create a session JWT for a user.
pub fn create_access_token(
    user_id: i64,
    signing_key: &[u8],
    ttl_minutes: i64,
) -> anyhow::Result<String> {
    let now = crate::time_utils::unix_now();

    let claims = Claims {
        sub: user_id.to_string(),
        iat: usize::try_from(now)?,
        exp: usize::try_from(now + ttl_minutes * 60)?,
        token_type: ACCESS_TOKEN_TYPE.to_string(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Validate a session JWT and return the user id it names.
pub fn decode_access_token(token: &str, signing_key: &[u8]) -> Result<i64, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AppError::InvalidToken
    })?;

    if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(AppError::InvalidToken);
    }

    token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_secret_key_32_bytes_minimum!";

    #[test]
    fn test_token_roundtrip() {
        let token = create_access_token(42, KEY, 60).unwrap();
        assert_eq!(decode_access_token(&token, KEY).unwrap(), 42);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = create_access_token(42, KEY, 60).unwrap();
        assert!(matches!(
            decode_access_token(&token, b"another_key"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let token = create_access_token(42, KEY, -5).unwrap();
        assert!(matches!(
            decode_access_token(&token, KEY),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_non_access_token_type_rejected() {
        let now = crate::time_utils::unix_now() as usize;
        let claims = Claims {
            sub: "42".to_string(),
            iat: now,
            exp: now + 600,
            token_type: "refresh".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();
        assert!(matches!(
            decode_access_token(&token, KEY),
            Err(AppError::InvalidToken)
        ));
    }
}
