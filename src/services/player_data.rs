// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player identity and valuation ingestion.
//!
//! nflverse rosters supply identities (GSIS id, FantasyPros id, Yahoo id).
//! FantasyCalc supplies trade values keyed by FantasyPros id. Both are
//! merged into local players through `player_source_mappings`. Each sync
//! runs in a single transaction, so a failure leaves nothing half-written.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::db::{self, Database};
use crate::models::player::sources;
use crate::models::{Position, ValueFormat};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Ingestion failures. Any of these aborts the sync without committing.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid roster CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Roster CSV is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Invalid values JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of an nflverse roster sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NflverseSyncReport {
    pub rows: usize,
    pub skipped: usize,
    pub new_players: usize,
    pub new_mappings: usize,
    pub yahoo_ids_linked: usize,
}

/// Outcome of a FantasyCalc value sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValueSyncReport {
    pub entries: usize,
    pub matched: usize,
    pub unmatched: usize,
}

/// Downloads and merges external player data.
#[derive(Clone)]
pub struct PlayerDataService {
    http: reqwest::Client,
    rosters_url: String,
    fantasycalc_base_url: String,
}

impl PlayerDataService {
    pub fn new(rosters_url: &str, fantasycalc_base_url: &str) -> Result<Self, IngestError> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?,
            rosters_url: rosters_url.to_string(),
            fantasycalc_base_url: fantasycalc_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response, IngestError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// Download the nflverse roster CSV and merge it into local players.
    pub async fn sync_nflverse_players(
        &self,
        db: &Database,
    ) -> Result<NflverseSyncReport, IngestError> {
        tracing::info!(url = %self.rosters_url, "Starting nflverse player sync");
        let body = self.fetch(&self.rosters_url).await?.bytes().await?;
        let report = import_nflverse_csv(db, &body).await?;
        tracing::info!(
            rows = report.rows,
            skipped = report.skipped,
            new_players = report.new_players,
            new_mappings = report.new_mappings,
            yahoo_ids_linked = report.yahoo_ids_linked,
            "nflverse player sync finished"
        );
        Ok(report)
    }

    /// URL of the FantasyCalc redraft values for a format.
    pub fn fantasycalc_url(&self, format: ValueFormat) -> String {
        format!(
            "{}/values/current?isDynasty=false&numQbs={}&numTeams=12&ppr=1",
            self.fantasycalc_base_url,
            format.num_qbs()
        )
    }

    /// Download current FantasyCalc values and append them for mapped players.
    pub async fn sync_fantasycalc_values(
        &self,
        db: &Database,
        format: ValueFormat,
    ) -> Result<ValueSyncReport, IngestError> {
        let url = self.fantasycalc_url(format);
        tracing::info!(url = %url, format = %format, "Starting FantasyCalc value sync");
        let body = self.fetch(&url).await?.bytes().await?;
        let entries: Vec<FantasyCalcEntry> = serde_json::from_slice(&body)?;
        let report = import_fantasycalc_values(db, &entries, format).await?;
        tracing::info!(
            format = %format,
            entries = report.entries,
            matched = report.matched,
            unmatched = report.unmatched,
            "FantasyCalc value sync finished"
        );
        Ok(report)
    }
}

// ─── nflverse rosters ────────────────────────────────────────────────────────

/// One usable roster row.
#[derive(Debug, Clone, PartialEq)]
struct RosterRow {
    player_id: String,
    player_name: String,
    position: String,
    team: Option<String>,
    fantasypros_id: Option<String>,
    yahoo_id: Option<String>,
}

/// Column positions, resolved from the header by the first matching name.
struct RosterColumns {
    player_id: usize,
    player_name: usize,
    position: usize,
    team: Option<usize>,
    fantasypros_id: Option<usize>,
    yahoo_id: Option<usize>,
}

impl RosterColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| headers.iter().position(|h| h.trim() == *name))
        };

        Ok(Self {
            player_id: find(&["player_id", "gsis_id"])
                .ok_or(IngestError::MissingColumn("player_id"))?,
            player_name: find(&["player_name", "full_name", "name"])
                .ok_or(IngestError::MissingColumn("player_name"))?,
            position: find(&["position"]).ok_or(IngestError::MissingColumn("position"))?,
            team: find(&["team"]),
            fantasypros_id: find(&["fantasypros_id"]),
            yahoo_id: find(&["yahoo_id"]),
        })
    }

    /// `None` when an identifying field is blank.
    fn row(&self, record: &csv::StringRecord) -> Option<RosterRow> {
        let field = |idx: usize| {
            record
                .get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty() && *s != "NA")
                .map(str::to_string)
        };
        let optional = |idx: Option<usize>| idx.and_then(field);

        Some(RosterRow {
            player_id: field(self.player_id)?,
            player_name: field(self.player_name)?,
            position: field(self.position)?,
            team: optional(self.team),
            fantasypros_id: optional(self.fantasypros_id).and_then(|s| normalize_id(&s)),
            yahoo_id: optional(self.yahoo_id).and_then(|s| normalize_id(&s)),
        })
    }
}

/// Ids exported through dataframes arrive as "123.0". Strip the fraction.
fn normalize_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() && f.fract() == 0.0 {
            return Some(format!("{}", f as i64));
        }
    }
    Some(raw.to_string())
}

fn parse_roster_csv(data: &[u8]) -> Result<(Vec<RosterRow>, usize), IngestError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);
    let columns = RosterColumns::from_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    let mut blank = 0;
    for record in reader.records() {
        match columns.row(&record?) {
            Some(row) => rows.push(row),
            None => blank += 1,
        }
    }
    Ok((rows, blank))
}

/// Merge roster CSV rows into local players, mappings and Yahoo ids.
///
/// A player is resolved by its nflverse mapping first, then its FantasyPros
/// mapping, and only created when neither exists, so re-running the import
/// adds nothing.
pub async fn import_nflverse_csv(
    db: &Database,
    data: &[u8],
) -> Result<NflverseSyncReport, IngestError> {
    let (rows, blank) = parse_roster_csv(data)?;
    let mut report = NflverseSyncReport {
        rows: rows.len() + blank,
        skipped: blank,
        ..Default::default()
    };

    let mut tx = db.begin().await?;

    for row in &rows {
        let existing = match db::players::find_by_mapping(&mut *tx, sources::NFLVERSE, &row.player_id)
            .await?
        {
            Some(id) => Some(id),
            None => match &row.fantasypros_id {
                Some(fp) => db::players::find_by_mapping(&mut *tx, sources::FANTASYPROS, fp).await?,
                None => None,
            },
        };

        let player_id = match existing {
            Some(id) => id,
            None => {
                let Ok(position) = row.position.parse::<Position>() else {
                    report.skipped += 1;
                    continue;
                };
                report.new_players += 1;
                db::players::insert(&mut *tx, &row.player_name, position, row.team.as_deref())
                    .await?
            }
        };

        if let Some(fp) = &row.fantasypros_id {
            if add_mapping(&mut tx, player_id, sources::FANTASYPROS, fp, &row.player_name).await? {
                report.new_mappings += 1;
            }
        }
        if add_mapping(
            &mut tx,
            player_id,
            sources::NFLVERSE,
            &row.player_id,
            &row.player_name,
        )
        .await?
        {
            report.new_mappings += 1;
        }

        if let Some(yahoo_id) = &row.yahoo_id {
            if db::players::find_by_yahoo_id(&mut *tx, yahoo_id).await?.is_none()
                && db::players::fill_yahoo_id(&mut *tx, player_id, yahoo_id).await?
            {
                report.yahoo_ids_linked += 1;
            }
        }
    }

    tx.commit().await?;
    Ok(report)
}

/// Add a source mapping unless the player already has one for the source or
/// the external id already belongs to someone else.
async fn add_mapping(
    conn: &mut sqlx::SqliteConnection,
    player_id: i64,
    source: &str,
    source_player_id: &str,
    name: &str,
) -> Result<bool, IngestError> {
    if db::players::has_mapping(&mut *conn, player_id, source).await? {
        return Ok(false);
    }
    if let Some(owner) = db::players::find_by_mapping(&mut *conn, source, source_player_id).await? {
        tracing::warn!(
            source,
            source_player_id,
            player_id,
            owner,
            "Source id already mapped to another player"
        );
        return Ok(false);
    }
    db::players::insert_mapping(&mut *conn, player_id, source, source_player_id, name).await?;
    Ok(true)
}

// ─── FantasyCalc values ──────────────────────────────────────────────────────

/// An id that may arrive as a JSON number or string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ExternalId {
    fn normalized(&self) -> Option<String> {
        match self {
            ExternalId::Int(i) => Some(i.to_string()),
            ExternalId::Float(f) => normalize_id(&f.to_string()),
            ExternalId::Text(s) => normalize_id(s),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FantasyCalcPlayer {
    #[serde(default, rename = "fantasyProsId")]
    pub fantasy_pros_id: Option<ExternalId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One element of the FantasyCalc values array. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FantasyCalcEntry {
    #[serde(default)]
    pub player_id: Option<ExternalId>,
    #[serde(default)]
    pub player: Option<FantasyCalcPlayer>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl FantasyCalcEntry {
    fn fantasypros_id(&self) -> Option<String> {
        self.player_id
            .as_ref()
            .and_then(ExternalId::normalized)
            .or_else(|| {
                self.player
                    .as_ref()?
                    .fantasy_pros_id
                    .as_ref()?
                    .normalized()
            })
    }

    fn value(&self) -> Option<i64> {
        self.value
            .filter(|v| v.is_finite())
            .map(|v| v.round() as i64)
            .filter(|v| *v != 0)
    }
}

/// Append a valuation for every entry whose FantasyPros id is mapped.
pub async fn import_fantasycalc_values(
    db: &Database,
    entries: &[FantasyCalcEntry],
    format: ValueFormat,
) -> Result<ValueSyncReport, IngestError> {
    let mut report = ValueSyncReport {
        entries: entries.len(),
        ..Default::default()
    };
    let now = Utc::now();

    let mut tx = db.begin().await?;
    for entry in entries {
        let (Some(fp_id), Some(value)) = (entry.fantasypros_id(), entry.value()) else {
            report.unmatched += 1;
            continue;
        };

        match db::players::find_by_mapping(&mut *tx, sources::FANTASYPROS, &fp_id).await? {
            Some(player_id) => {
                db::players::insert_value(
                    &mut *tx,
                    player_id,
                    value,
                    format,
                    sources::FANTASYCALC,
                    now,
                )
                .await?;
                report.matched += 1;
            }
            None => report.unmatched += 1,
        }
    }
    tx.commit().await?;

    Ok(report)
}
