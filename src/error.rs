// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Yahoo account is not linked")]
    YahooNotLinked,

    #[error("Yahoo API error: {0}")]
    YahooApi(String),

    #[error("Failed to parse upstream response: {0}")]
    UpstreamParse(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when Yahoo answers 401 to an API call.
    pub const YAHOO_TOKEN_REJECTED: &'static str = "Yahoo rejected the access token";
    /// Message used when Yahoo answers 429.
    pub const YAHOO_RATE_LIMIT: &'static str = "Yahoo rate limit exceeded";

    /// True if the error means the Yahoo credentials are unusable and the
    /// user has to link the account again.
    pub fn requires_relink(&self) -> bool {
        match self {
            AppError::YahooNotLinked => true,
            AppError::YahooApi(msg) => msg == Self::YAHOO_TOKEN_REJECTED,
            _ => false,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                Some(self.to_string()),
            ),
            AppError::InactiveUser => (
                StatusCode::BAD_REQUEST,
                "inactive_user",
                Some(self.to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, "already_exists", Some(msg.clone()))
            }
            AppError::YahooNotLinked => (
                StatusCode::UNAUTHORIZED,
                "yahoo_not_linked",
                Some(self.to_string()),
            ),
            AppError::YahooApi(msg) => (StatusCode::BAD_GATEWAY, "yahoo_error", Some(msg.clone())),
            AppError::UpstreamParse(msg) => {
                tracing::warn!(error = %msg, "Upstream response could not be parsed");
                (StatusCode::BAD_GATEWAY, "upstream_parse_error", None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
