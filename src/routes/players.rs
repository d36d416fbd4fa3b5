// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local player listing for the trade-analyzer picker.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{self, players::PlayerFilter};
use crate::error::{AppError, Result};
use crate::models::{ParseEnumError, PlayerListing, Position, ValueFormat};
use crate::AppState;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/players", get(list_players))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPlayersParams {
    search: Option<String>,
    position: Option<String>,
    format: Option<String>,
    limit: Option<i64>,
}

fn parse_optional<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = ParseEnumError>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|e: ParseEnumError| AppError::BadRequest(e.to_string())),
    }
}

impl ListPlayersParams {
    fn into_filter(self) -> Result<PlayerFilter> {
        Ok(PlayerFilter {
            position: parse_optional::<Position>(self.position.as_deref())?,
            format: parse_optional::<ValueFormat>(self.format.as_deref())?.unwrap_or_default(),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            search: self.search.map(|s| s.trim().to_string()),
        })
    }
}

async fn list_players(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPlayersParams>,
) -> Result<Json<Vec<PlayerListing>>> {
    let filter = params.into_filter()?;
    let players = db::players::list(state.db.pool(), &filter).await?;
    Ok(Json(players))
}
