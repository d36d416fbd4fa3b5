// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trade analysis from cached player valuations.

use std::collections::HashSet;

use crate::db::{self, Database};
use crate::error::AppError;
use crate::models::{TradeAnalysis, TradeRequest, TradeSideAnalysis, TradeVerdict, ValueFormat};

/// Percent difference beyond which a trade is lopsided.
const STRONG_THRESHOLD_PCT: f64 = 10.0;
/// Percent difference beyond which a trade leans one way.
const LEAN_THRESHOLD_PCT: f64 = 3.0;

const RECEIVING_FOR_NOTHING: &str = "You are receiving value for nothing. Accept this trade.";
const GIVING_FOR_NOTHING: &str = "You are giving away value for nothing. Decline this trade.";

/// Judge a trade from the value given (`my_total`) and received
/// (`their_total`).
///
/// The difference is taken relative to the mean of both totals, so the
/// verdict does not depend on which side is larger.
pub fn recommend(my_total: i64, their_total: i64) -> (TradeVerdict, &'static str) {
    match (my_total, their_total) {
        (0, 0) => (TradeVerdict::NoValue, TradeVerdict::NoValue.message()),
        (0, _) => (TradeVerdict::StrongAccept, RECEIVING_FOR_NOTHING),
        (_, 0) => (TradeVerdict::StrongDecline, GIVING_FOR_NOTHING),
        _ => {
            let average = (my_total + their_total) as f64 / 2.0;
            let pct = (their_total - my_total) as f64 * 100.0 / average;

            let verdict = if pct > STRONG_THRESHOLD_PCT {
                TradeVerdict::StrongAccept
            } else if pct > LEAN_THRESHOLD_PCT {
                TradeVerdict::Accept
            } else if pct < -STRONG_THRESHOLD_PCT {
                TradeVerdict::StrongDecline
            } else if pct < -LEAN_THRESHOLD_PCT {
                TradeVerdict::Decline
            } else {
                TradeVerdict::Balanced
            };
            (verdict, verdict.message())
        }
    }
}

/// Remove repeated ids, keeping first occurrences in order.
fn dedup(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Check a request before touching the database.
pub fn validate(request: &TradeRequest) -> Result<ValueFormat, AppError> {
    if request.my_player_ids.is_empty() && request.their_player_ids.is_empty() {
        return Err(AppError::BadRequest(
            "At least one player must be included in the trade".to_string(),
        ));
    }

    let mine: HashSet<i64> = request.my_player_ids.iter().copied().collect();
    if let Some(id) = request.their_player_ids.iter().find(|id| mine.contains(id)) {
        return Err(AppError::BadRequest(format!(
            "Player {} appears on both sides of the trade",
            id
        )));
    }

    request
        .league_format
        .parse()
        .map_err(|e: crate::models::ParseEnumError| AppError::BadRequest(e.to_string()))
}

/// Value both sides of a trade and produce a recommendation.
pub async fn analyze(db: &Database, request: &TradeRequest) -> Result<TradeAnalysis, AppError> {
    let format = validate(request)?;

    let my_players =
        db::players::latest_values(db.pool(), &dedup(&request.my_player_ids), format).await?;
    let their_players =
        db::players::latest_values(db.pool(), &dedup(&request.their_player_ids), format).await?;

    let my_side = TradeSideAnalysis::new(my_players);
    let their_side = TradeSideAnalysis::new(their_players);
    let (verdict, recommendation) = recommend(my_side.total_value, their_side.total_value);

    tracing::debug!(
        format = %format,
        my_total = my_side.total_value,
        their_total = their_side.total_value,
        ?verdict,
        "Trade analyzed"
    );

    Ok(TradeAnalysis {
        value_difference: their_side.total_value - my_side.total_value,
        my_side,
        their_side,
        recommendation: recommendation.to_string(),
        verdict,
    })
}
