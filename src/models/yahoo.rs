// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Yahoo Fantasy resources translated from XML into API responses.

use serde::Serialize;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::{ParseEnumError, ScoringType};

/// A fantasy league the user belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct YahooLeague {
    pub league_key: String,
    pub league_id: String,
    pub name: String,
    pub url: String,
    pub season: i32,
    pub num_teams: Option<u32>,
    pub scoring_type: Option<ScoringType>,
}

/// Player available on the waiver wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WaiverPlayer {
    pub player_key: String,
    pub player_id: String,
    pub full_name: String,
    pub editorial_team_abbr: String,
    pub display_position: String,
    pub eligible_positions: Vec<String>,
    pub image_url: Option<String>,
    pub percent_owned: i32,
}

/// A fantasy team as listed under the user's games.
#[derive(Debug, Clone, PartialEq)]
pub struct YahooTeam {
    pub team_key: String,
    pub name: String,
}

/// Player on a team roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RosterPlayer {
    pub player_key: String,
    pub player_id: String,
    pub full_name: String,
    pub editorial_team_abbr: String,
    pub display_position: String,
    /// Lineup slot for the current week (e.g. "BN", "W/R/T")
    pub selected_position: Option<String>,
    /// Matching local player, when the Yahoo id is known locally
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub local_player_id: Option<i64>,
}

/// The user's roster in one league.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TeamRoster {
    pub team_key: String,
    pub team_name: String,
    pub players: Vec<RosterPlayer>,
}

/// Waiver-wire status filter understood by Yahoo's `players;status=` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    /// On waivers
    #[default]
    Waivers,
    /// Free agents
    FreeAgents,
    /// All available (waivers + free agents)
    Available,
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Waivers => "W",
            PlayerStatus::FreeAgents => "FA",
            PlayerStatus::Available => "A",
        }
    }
}

impl FromStr for PlayerStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "W" => Ok(PlayerStatus::Waivers),
            "FA" => Ok(PlayerStatus::FreeAgents),
            "A" => Ok(PlayerStatus::Available),
            _ => Err(ParseEnumError::new("player status", s)),
        }
    }
}

/// Response of `GET /yahoo/auth`.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthUrlResponse {
    pub authorization_url: String,
}

/// Response of `GET /yahoo/status`.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct YahooLinkStatus {
    pub is_linked: bool,
}

/// Response of `GET /yahoo/leagues`.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct YahooLeaguesResponse {
    pub leagues: Vec<YahooLeague>,
}
