// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Encrypted Yahoo OAuth tokens, one row per user.

use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::models::YahooTokens;

pub async fn get(
    db: impl SqliteExecutor<'_>,
    user_id: i64,
) -> Result<Option<YahooTokens>, sqlx::Error> {
    sqlx::query_as::<_, YahooTokens>(
        "SELECT user_id, access_token, refresh_token, token_type, expires_at \
         FROM yahoo_tokens WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Insert or replace the user's tokens.
pub async fn upsert(db: impl SqliteExecutor<'_>, tokens: &YahooTokens) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO yahoo_tokens \
             (user_id, access_token, refresh_token, token_type, expires_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT(user_id) DO UPDATE SET \
             access_token = excluded.access_token, \
             refresh_token = excluded.refresh_token, \
             token_type = excluded.token_type, \
             expires_at = excluded.expires_at, \
             updated_at = excluded.updated_at",
    )
    .bind(tokens.user_id)
    .bind(&tokens.access_token_encrypted)
    .bind(&tokens.refresh_token_encrypted)
    .bind(&tokens.token_type)
    .bind(tokens.expires_at)
    .bind(Utc::now())
    .execute(db)
    .await?;
    Ok(())
}

/// Delete the user's tokens. Returns whether a row existed.
pub async fn delete(db: impl SqliteExecutor<'_>, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM yahoo_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
