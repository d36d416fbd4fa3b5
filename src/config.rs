// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first for local
//! development; real environment variables take precedence.

use std::env;

/// Yahoo Fantasy Sports REST base.
pub const DEFAULT_YAHOO_API_BASE_URL: &str = "https://fantasysports.yahooapis.com/fantasy/v2";
/// Yahoo OAuth2 endpoints (`/oauth2/request_auth`, `/oauth2/get_token`).
pub const DEFAULT_YAHOO_OAUTH_BASE_URL: &str = "https://api.login.yahoo.com";
/// Player data sources, read by the `seed-players` binary.
pub const DEFAULT_NFLVERSE_ROSTERS_URL: &str =
    "https://github.com/nflverse/nflverse-data/blob/master/rosters/rosters_2023.csv?raw=true";
pub const DEFAULT_FANTASYCALC_BASE_URL: &str = "https://api.fantasycalc.com";

/// Name of the HttpOnly session cookie.
pub const SESSION_COOKIE_NAME: &str = "access_token_cookie";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Prefix for versioned API routes
    pub api_v1_str: String,
    /// SQLite connection string (e.g. `sqlite://fantasy.db?mode=rwc`)
    pub database_url: String,
    /// Frontend URL for CORS and OAuth redirects
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Session lifetime in minutes
    pub access_token_expire_minutes: i64,
    /// Yahoo OAuth client ID (public)
    pub yahoo_client_id: String,
    /// Callback URL registered with Yahoo
    pub yahoo_redirect_uri: String,
    pub yahoo_api_base_url: String,
    pub yahoo_oauth_base_url: String,

    // --- Secrets ---
    /// Yahoo OAuth client secret
    pub yahoo_client_secret: String,
    /// Signing key for session JWTs, OAuth state, and token encryption (raw bytes)
    pub secret_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_v1_str = env::var("API_V1_STR").unwrap_or_else(|_| "/api/v1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .unwrap_or(8000);

        let yahoo_redirect_uri = env::var("YAHOO_REDIRECT_URI").unwrap_or_else(|_| {
            let host = env::var("API_HOST").unwrap_or_else(|_| format!("http://localhost:{}", port));
            format!("{}{}/yahoo/callback", host, api_v1_str)
        });

        let access_token_expire_minutes = match env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_EXPIRE_MINUTES"))?,
            Err(_) => 60 * 24 * 7,
        };

        Ok(Self {
            api_v1_str,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port,
            access_token_expire_minutes,
            yahoo_client_id: env::var("YAHOO_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("YAHOO_CLIENT_ID"))?,
            yahoo_redirect_uri,
            yahoo_api_base_url: env::var("YAHOO_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_YAHOO_API_BASE_URL.to_string()),
            yahoo_oauth_base_url: env::var("YAHOO_OAUTH_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_YAHOO_OAUTH_BASE_URL.to_string()),

            // Secrets
            yahoo_client_secret: env::var("YAHOO_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("YAHOO_CLIENT_SECRET"))?,
            secret_key: env::var("SECRET_KEY")
                .map_err(|_| ConfigError::Missing("SECRET_KEY"))?
                .into_bytes(),
        })
    }

    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            api_v1_str: "/api/v1".to_string(),
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8000,
            access_token_expire_minutes: 60,
            yahoo_client_id: "test_client_id".to_string(),
            yahoo_redirect_uri: "http://localhost:8000/api/v1/yahoo/callback".to_string(),
            yahoo_api_base_url: DEFAULT_YAHOO_API_BASE_URL.to_string(),
            yahoo_oauth_base_url: DEFAULT_YAHOO_OAUTH_BASE_URL.to_string(),
            yahoo_client_secret: "test_secret".to_string(),
            secret_key: b"test_secret_key_32_bytes_minimum!".to_vec(),
        }
    }

    /// Whether cookies should carry the `Secure` attribute.
    ///
    /// Follows the frontend scheme so local HTTP development keeps working.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
