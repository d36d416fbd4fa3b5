// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trade analyzer request and response types.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::Position;

fn default_league_format() -> String {
    "Superflex".to_string()
}

/// Body of `POST /trade/analyze`.
///
/// "My" side is what the caller gives away, "their" side is what the caller
/// receives.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TradeRequest {
    #[serde(default, alias = "team_a_players")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number[]"))]
    pub my_player_ids: Vec<i64>,
    #[serde(default, alias = "team_b_players")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number[]"))]
    pub their_player_ids: Vec<i64>,
    /// "1QB" or "Superflex"
    #[serde(default = "default_league_format")]
    pub league_format: String,
}

/// One valued player in a trade.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlayerTradeInfo {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub player_id: i64,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub position: Position,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TradeSideAnalysis {
    pub players: Vec<PlayerTradeInfo>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_value: i64,
}

impl TradeSideAnalysis {
    pub fn new(players: Vec<PlayerTradeInfo>) -> Self {
        let total_value = players.iter().map(|p| p.value).sum();
        Self {
            players,
            total_value,
        }
    }
}

/// Machine-readable outcome of a trade evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum TradeVerdict {
    StrongAccept,
    Accept,
    Balanced,
    Decline,
    StrongDecline,
    /// Neither side carries any value
    NoValue,
}

impl TradeVerdict {
    pub fn message(&self) -> &'static str {
        match self {
            TradeVerdict::StrongAccept => {
                "This trade is heavily in your favor. It's a clear accept."
            }
            TradeVerdict::Accept => "This trade looks favorable for you. Recommended to accept.",
            TradeVerdict::Balanced => "This trade appears to be fairly balanced.",
            TradeVerdict::Decline => {
                "This trade is not in your favor. Recommended to decline or renegotiate."
            }
            TradeVerdict::StrongDecline => {
                "This trade is heavily against you. It's a clear decline."
            }
            TradeVerdict::NoValue => "Cannot analyze a trade with players of zero value.",
        }
    }
}

/// Response of `POST /trade/analyze`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TradeAnalysis {
    pub my_side: TradeSideAnalysis,
    pub their_side: TradeSideAnalysis,
    pub recommendation: String,
    pub verdict: TradeVerdict,
    /// Received minus given
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub value_difference: i64,
}
