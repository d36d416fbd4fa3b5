//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Local account stored in the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// Login name (unique)
    pub email: String,
    /// PBKDF2 hash, see `services::password`
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// User as returned to clients (never includes the password hash).
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserPublic {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            is_active: user.is_active,
        }
    }
}

/// User's Yahoo OAuth tokens (encrypted at rest).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct YahooTokens {
    pub user_id: i64,
    /// Encrypted access token (base64)
    #[sqlx(rename = "access_token")]
    pub access_token_encrypted: String,
    /// Encrypted refresh token (base64)
    #[sqlx(rename = "refresh_token")]
    pub refresh_token_encrypted: String,
    pub token_type: String,
    /// When the access token expires (Unix seconds)
    pub expires_at: i64,
}
