// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Queries against the `users` table.

use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::error::AppError;
use crate::models::User;

/// Message for a registration with an email that is already in use.
pub const EMAIL_TAKEN: &str = "The user with this email already exists.";

const USER_COLUMNS: &str = "id, email, hashed_password, full_name, is_active, created_at";

pub async fn get_by_id(db: impl SqliteExecutor<'_>, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Look up a user by email, ignoring case.
pub async fn get_by_email(
    db: impl SqliteExecutor<'_>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
    ))
    .bind(email)
    .fetch_optional(db)
    .await
}

/// Insert a new active user.
///
/// A taken email (the column is unique, case-insensitively) is a `Conflict`,
/// including when a concurrent registration wins the race.
pub async fn create(
    db: impl SqliteExecutor<'_>,
    email: &str,
    hashed_password: &str,
    full_name: Option<&str>,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, hashed_password, full_name, is_active, created_at) \
         VALUES (?, ?, ?, 1, ?) RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(hashed_password)
    .bind(full_name)
    .bind(Utc::now())
    .fetch_one(db)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(EMAIL_TAKEN.to_string())
        }
        e => e.into(),
    })
}

pub async fn set_active(
    db: impl SqliteExecutor<'_>,
    id: i64,
    is_active: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
