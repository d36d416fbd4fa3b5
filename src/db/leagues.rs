// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cached Yahoo leagues, teams and roster links.

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::models::{League, Team, YahooLeague};

pub async fn get_by_key(
    db: impl SqliteExecutor<'_>,
    league_key: &str,
) -> Result<Option<League>, sqlx::Error> {
    sqlx::query_as::<_, League>(
        "SELECT id, yahoo_league_id, name, season, scoring_type, url, owner_id \
         FROM leagues WHERE yahoo_league_id = ?",
    )
    .bind(league_key)
    .fetch_optional(db)
    .await
}

/// Insert or refresh a league, keyed by its Yahoo league key.
///
/// A known scoring type is never cleared by a later fetch that lacks one.
/// The first member to fetch a league owns it; the owner is only replaced
/// once that user is gone.
pub async fn upsert(
    db: impl SqliteExecutor<'_>,
    league: &YahooLeague,
    owner_id: i64,
) -> Result<League, sqlx::Error> {
    sqlx::query_as::<_, League>(
        "INSERT INTO leagues (yahoo_league_id, name, season, scoring_type, url, owner_id) \
         VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT(yahoo_league_id) DO UPDATE SET \
             name = excluded.name, \
             season = excluded.season, \
             scoring_type = COALESCE(excluded.scoring_type, leagues.scoring_type), \
             url = excluded.url, \
             owner_id = COALESCE(leagues.owner_id, excluded.owner_id) \
         RETURNING id, yahoo_league_id, name, season, scoring_type, url, owner_id",
    )
    .bind(&league.league_key)
    .bind(&league.name)
    .bind(league.season)
    .bind(league.scoring_type.map(|s| s.as_str()))
    .bind(&league.url)
    .bind(owner_id)
    .fetch_one(db)
    .await
}

pub async fn upsert_team(
    db: impl SqliteExecutor<'_>,
    league_id: i64,
    team_key: &str,
    name: &str,
) -> Result<Team, sqlx::Error> {
    sqlx::query_as::<_, Team>(
        "INSERT INTO teams (yahoo_team_id, name, league_id) VALUES (?, ?, ?) \
         ON CONFLICT(league_id, yahoo_team_id) DO UPDATE SET name = excluded.name \
         RETURNING id, yahoo_team_id, name, league_id",
    )
    .bind(team_key)
    .bind(name)
    .bind(league_id)
    .fetch_one(db)
    .await
}

/// Replace a team's roster links with `player_ids`.
///
/// Run inside a transaction so readers never see a half-replaced roster.
pub async fn replace_roster(
    tx: &mut sqlx::SqliteConnection,
    team_id: i64,
    player_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM roster_association WHERE team_id = ?")
        .bind(team_id)
        .execute(&mut *tx)
        .await?;

    if player_ids.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT OR IGNORE INTO roster_association (team_id, player_id) ");
    qb.push_values(player_ids, |mut row, player_id| {
        row.push_bind(team_id).push_bind(*player_id);
    });
    qb.build().execute(&mut *tx).await?;
    Ok(())
}

pub async fn roster_player_ids(
    db: impl SqliteExecutor<'_>,
    team_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT player_id FROM roster_association WHERE team_id = ? ORDER BY player_id",
    )
    .bind(team_id)
    .fetch_all(db)
    .await
}
