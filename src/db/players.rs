// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player identities, source mappings and valuations.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};
use std::collections::HashMap;

use crate::models::{
    Player, PlayerListing, PlayerSourceMapping, PlayerTradeInfo, PlayerValue, Position,
    ValueFormat,
};

/// Picks the newest valuation row for `p.id` in the bound format.
const LATEST_VALUE_ID: &str = "SELECT v2.id FROM player_values v2 \
     WHERE v2.player_id = p.id AND v2.format = v.format \
     ORDER BY julianday(v2.date_updated) DESC, v2.id DESC LIMIT 1";

// ─── Identities ──────────────────────────────────────────────────────────────

pub async fn get(db: impl SqliteExecutor<'_>, id: i64) -> Result<Option<Player>, sqlx::Error> {
    sqlx::query_as::<_, Player>(
        "SELECT id, yahoo_player_id, name, position, nfl_team_abbr, bye_week, adp, projection \
         FROM players WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert(
    db: impl SqliteExecutor<'_>,
    name: &str,
    position: Position,
    nfl_team_abbr: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO players (name, position, nfl_team_abbr) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(position.as_str())
    .bind(nfl_team_abbr)
    .fetch_one(db)
    .await
}

/// Player currently holding a Yahoo id, if any.
pub async fn find_by_yahoo_id(
    db: impl SqliteExecutor<'_>,
    yahoo_player_id: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM players WHERE yahoo_player_id = ?")
        .bind(yahoo_player_id)
        .fetch_optional(db)
        .await
}

/// Map Yahoo ids to local player ids. Unknown ids are absent from the result.
pub async fn ids_by_yahoo_ids(
    db: impl SqliteExecutor<'_>,
    yahoo_player_ids: &[String],
) -> Result<HashMap<String, i64>, sqlx::Error> {
    if yahoo_player_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT yahoo_player_id, id FROM players WHERE yahoo_player_id IN (");
    let mut separated = qb.separated(", ");
    for id in yahoo_player_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let rows: Vec<(String, i64)> = qb.build_query_as().fetch_all(db).await?;
    Ok(rows.into_iter().collect())
}

/// Set the Yahoo id only when the player has none yet.
///
/// Returns whether the row changed.
pub async fn fill_yahoo_id(
    db: impl SqliteExecutor<'_>,
    player_id: i64,
    yahoo_player_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE players SET yahoo_player_id = ? WHERE id = ? AND yahoo_player_id IS NULL",
    )
    .bind(yahoo_player_id)
    .bind(player_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ─── Source mappings ─────────────────────────────────────────────────────────

/// Local player mapped to `source_player_id` in `source`.
pub async fn find_by_mapping(
    db: impl SqliteExecutor<'_>,
    source: &str,
    source_player_id: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT player_id FROM player_source_mappings WHERE source = ? AND source_player_id = ?",
    )
    .bind(source)
    .bind(source_player_id)
    .fetch_optional(db)
    .await
}

pub async fn has_mapping(
    db: impl SqliteExecutor<'_>,
    player_id: i64,
    source: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM player_source_mappings WHERE player_id = ? AND source = ?",
    )
    .bind(player_id)
    .bind(source)
    .fetch_optional(db)
    .await?;
    Ok(found.is_some())
}

/// Every external id linked to a player.
pub async fn mappings(
    db: impl SqliteExecutor<'_>,
    player_id: i64,
) -> Result<Vec<PlayerSourceMapping>, sqlx::Error> {
    sqlx::query_as::<_, PlayerSourceMapping>(
        "SELECT id, player_id, source, source_player_id, source_player_name \
         FROM player_source_mappings WHERE player_id = ? ORDER BY source",
    )
    .bind(player_id)
    .fetch_all(db)
    .await
}

pub async fn insert_mapping(
    db: impl SqliteExecutor<'_>,
    player_id: i64,
    source: &str,
    source_player_id: &str,
    source_player_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO player_source_mappings \
             (player_id, source, source_player_id, source_player_name) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(player_id)
    .bind(source)
    .bind(source_player_id)
    .bind(source_player_name)
    .execute(db)
    .await?;
    Ok(())
}

// ─── Valuations ──────────────────────────────────────────────────────────────

pub async fn insert_value(
    db: impl SqliteExecutor<'_>,
    player_id: i64,
    value: i64,
    format: ValueFormat,
    source: &str,
    date_updated: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO player_values (player_id, value, format, source, date_updated) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(player_id)
    .bind(value)
    .bind(format.as_str())
    .bind(source)
    .bind(date_updated)
    .execute(db)
    .await?;
    Ok(())
}

/// All stored valuations of a player in one format, newest first.
pub async fn value_history(
    db: impl SqliteExecutor<'_>,
    player_id: i64,
    format: ValueFormat,
) -> Result<Vec<PlayerValue>, sqlx::Error> {
    sqlx::query_as::<_, PlayerValue>(
        "SELECT id, player_id, value, format, source, date_updated FROM player_values \
         WHERE player_id = ? AND format = ? \
         ORDER BY julianday(date_updated) DESC, id DESC",
    )
    .bind(player_id)
    .bind(format.as_str())
    .fetch_all(db)
    .await
}

/// Latest value in `format` for each of `ids`, in request order.
///
/// Players with no value in that format are left out. Duplicate ids appear
/// once, at their first position.
pub async fn latest_values(
    db: impl SqliteExecutor<'_>,
    ids: &[i64],
    format: ValueFormat,
) -> Result<Vec<PlayerTradeInfo>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT p.id AS player_id, p.name, p.position, v.value \
         FROM players p JOIN player_values v ON v.player_id = p.id \
         WHERE v.format = ",
    );
    qb.push_bind(format.as_str());
    qb.push(format!(" AND v.id = ({LATEST_VALUE_ID}) AND p.id IN ("));
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows: Vec<PlayerTradeInfo> = qb.build_query_as().fetch_all(db).await?;
    let mut by_id: HashMap<i64, PlayerTradeInfo> =
        rows.into_iter().map(|r| (r.player_id, r)).collect();

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

/// Filters for the player listing.
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    pub position: Option<Position>,
    pub format: ValueFormat,
    pub limit: i64,
}

/// Players with their latest value, best first.
pub async fn list(
    db: impl SqliteExecutor<'_>,
    filter: &PlayerFilter,
) -> Result<Vec<PlayerListing>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT p.id AS player_id, p.name AS full_name, p.position, p.nfl_team_abbr, \
         (SELECT v.value FROM player_values v WHERE v.player_id = p.id AND v.format = ",
    );
    qb.push_bind(filter.format.as_str());
    qb.push(
        " ORDER BY julianday(v.date_updated) DESC, v.id DESC LIMIT 1) AS value \
         FROM players p WHERE 1 = 1",
    );

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND p.name LIKE ");
        qb.push_bind(format!("%{}%", escape_like(search)));
        qb.push(" ESCAPE '\\'");
    }
    if let Some(position) = filter.position {
        qb.push(" AND p.position = ");
        qb.push_bind(position.as_str());
    }

    qb.push(" ORDER BY value IS NULL, value DESC, p.name LIMIT ");
    qb.push_bind(filter.limit);

    qb.build_query_as().fetch_all(db).await
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
