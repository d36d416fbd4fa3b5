// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player identity, valuation and source-mapping records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::ParseEnumError;

/// Names of the external systems a player identity can come from.
pub mod sources {
    /// nflverse roster data (GSIS ids)
    pub const NFLVERSE: &str = "nflverse";
    /// FantasyPros ids, shared by nflverse and FantasyCalc
    pub const FANTASYPROS: &str = "fantasypros";
    /// Source label on stored valuations
    pub const FANTASYCALC: &str = "FantasyCalc";
}

/// Fantasy-relevant roster position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::DEF,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DEF",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == upper)
            .ok_or_else(|| ParseEnumError::new("position", s))
    }
}

impl TryFrom<String> for Position {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Valuation format. Superflex leagues value quarterbacks much higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ValueFormat {
    #[serde(rename = "1QB")]
    OneQb,
    #[default]
    Superflex,
}

impl ValueFormat {
    pub const ALL: [ValueFormat; 2] = [ValueFormat::OneQb, ValueFormat::Superflex];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueFormat::OneQb => "1QB",
            ValueFormat::Superflex => "Superflex",
        }
    }

    /// Number of starting quarterbacks, as FantasyCalc's `numQbs` expects.
    pub fn num_qbs(&self) -> u8 {
        match self {
            ValueFormat::OneQb => 1,
            ValueFormat::Superflex => 2,
        }
    }
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1qb" | "oneqb" => Ok(ValueFormat::OneQb),
            "superflex" | "sf" | "2qb" => Ok(ValueFormat::Superflex),
            _ => Err(ParseEnumError::new("value format", s)),
        }
    }
}

impl TryFrom<String> for ValueFormat {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// League scoring system (points per reception).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ScoringType {
    #[serde(rename = "PPR")]
    Ppr,
    #[serde(rename = "Half-PPR")]
    HalfPpr,
    #[serde(rename = "Standard")]
    Standard,
}

impl ScoringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringType::Ppr => "PPR",
            ScoringType::HalfPpr => "Half-PPR",
            ScoringType::Standard => "Standard",
        }
    }

    /// Classify by points awarded per reception.
    pub fn from_points_per_reception(points: f64) -> Self {
        if points >= 1.0 {
            ScoringType::Ppr
        } else if points >= 0.5 {
            ScoringType::HalfPpr
        } else {
            ScoringType::Standard
        }
    }
}

/// Local player identity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Player {
    pub id: i64,
    pub yahoo_player_id: Option<String>,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub position: Position,
    pub nfl_team_abbr: Option<String>,
    pub bye_week: Option<i64>,
    pub adp: Option<f64>,
    pub projection: Option<f64>,
}

/// Links a local player to an identifier in an external source.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerSourceMapping {
    pub id: i64,
    pub player_id: i64,
    pub source: String,
    pub source_player_id: String,
    pub source_player_name: String,
}

/// A point-in-time trade value for a player in one format.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerValue {
    pub id: i64,
    pub player_id: i64,
    pub value: i64,
    #[sqlx(try_from = "String")]
    pub format: ValueFormat,
    pub source: String,
    pub date_updated: DateTime<Utc>,
}

/// Player entry in the `/players` listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlayerListing {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub player_id: i64,
    pub full_name: String,
    #[sqlx(try_from = "String")]
    pub position: Position,
    pub nfl_team_abbr: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub value: Option<i64>,
}
