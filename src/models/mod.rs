// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod league;
pub mod player;
pub mod trade;
pub mod user;
pub mod yahoo;

pub use league::{League, Team};
pub use player::{
    Player, PlayerListing, PlayerSourceMapping, PlayerValue, Position, ScoringType, ValueFormat,
};
pub use trade::{PlayerTradeInfo, TradeAnalysis, TradeRequest, TradeSideAnalysis, TradeVerdict};
pub use user::{User, UserPublic, YahooTokens};
pub use yahoo::{PlayerStatus, RosterPlayer, TeamRoster, WaiverPlayer, YahooLeague, YahooTeam};

/// A string did not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
