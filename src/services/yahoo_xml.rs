// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Parsers for Yahoo Fantasy XML documents.
//!
//! Yahoo wraps every response in a namespaced `<fantasy_content>` element.
//! Elements are matched by local name only, and lookups go by child name
//! rather than position since Yahoo adds fields over time.

use roxmltree::{Document, Node};

use crate::error::AppError;
use crate::models::{RosterPlayer, ScoringType, TeamRoster, WaiverPlayer, YahooLeague, YahooTeam};

/// Yahoo `stat_id` for receptions.
const RECEPTIONS_STAT_ID: &str = "11";

fn parse_document(xml: &str) -> Result<Document<'_>, AppError> {
    Document::parse(xml).map_err(|e| AppError::UpstreamParse(format!("Invalid XML: {}", e)))
}

fn is(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is(c, name))
}

/// Trimmed text of a direct child, `None` when missing or blank.
fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn path_text<'a>(node: Node<'a, '_>, path: &[&str]) -> Option<&'a str> {
    let (last, parents) = path.split_last()?;
    let mut current = node;
    for name in parents {
        current = child(current, name)?;
    }
    child_text(current, last)
}

fn elements<'a, 'input: 'a>(
    doc: &'a Document<'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants().filter(move |n| is(n, name))
}

// ─── Leagues ─────────────────────────────────────────────────────────────────

/// Parse every `<league>` in a document.
///
/// Leagues without a key, name or numeric season are skipped.
pub fn parse_leagues(xml: &str) -> Result<Vec<YahooLeague>, AppError> {
    let doc = parse_document(xml)?;
    Ok(elements(&doc, "league").filter_map(parse_league).collect())
}

fn parse_league(node: Node) -> Option<YahooLeague> {
    let league_key = child_text(node, "league_key")?;
    let name = child_text(node, "name")?;
    let season = child_text(node, "season")?.parse().ok()?;

    let league_id = child_text(node, "league_id")
        .map(str::to_string)
        .or_else(|| league_key.rsplit(".l.").next().map(str::to_string))
        .unwrap_or_default();

    Some(YahooLeague {
        league_key: league_key.to_string(),
        league_id,
        name: name.to_string(),
        url: child_text(node, "url").unwrap_or_default().to_string(),
        season,
        num_teams: child_text(node, "num_teams").and_then(|s| s.parse().ok()),
        scoring_type: scoring_type(node),
    })
}

/// Derive PPR/Half-PPR/Standard from the league's stat modifiers.
///
/// Returns `None` when the document carries no settings. With settings but
/// no reception modifier the league is Standard.
fn scoring_type(league: Node) -> Option<ScoringType> {
    let stats = child(child(child(league, "settings")?, "stat_modifiers")?, "stats")?;

    let points = stats
        .children()
        .filter(|c| is(c, "stat"))
        .find(|stat| child_text(*stat, "stat_id") == Some(RECEPTIONS_STAT_ID))
        .and_then(|stat| child_text(stat, "value"))
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0);

    Some(ScoringType::from_points_per_reception(points))
}

// ─── Players ─────────────────────────────────────────────────────────────────

struct PlayerFields<'a> {
    player_key: &'a str,
    player_id: &'a str,
    full_name: &'a str,
    editorial_team_abbr: &'a str,
    display_position: &'a str,
}

/// Missing fields come back empty; Yahoo occasionally omits them and the
/// player is still worth showing.
fn player_fields<'a>(node: Node<'a, '_>) -> PlayerFields<'a> {
    PlayerFields {
        player_key: child_text(node, "player_key").unwrap_or_default(),
        player_id: child_text(node, "player_id").unwrap_or_default(),
        full_name: path_text(node, &["name", "full"]).unwrap_or_default(),
        editorial_team_abbr: child_text(node, "editorial_team_abbr").unwrap_or_default(),
        display_position: child_text(node, "display_position").unwrap_or_default(),
    }
}

/// Parse the players of a `players;status=...` collection.
///
/// A player whose ownership percentage is not an integer is dropped with a
/// warning so one bad record does not hide the rest of the waiver wire.
pub fn parse_waiver_players(xml: &str) -> Result<Vec<WaiverPlayer>, AppError> {
    let doc = parse_document(xml)?;
    let mut players = Vec::new();

    for node in elements(&doc, "player") {
        let fields = player_fields(node);

        let percent_owned = match path_text(node, &["percent_owned", "value"]) {
            None => 0,
            Some(raw) => match raw.parse::<i32>() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(
                        player_key = fields.player_key,
                        value = raw,
                        "Skipping player with non-integer percent_owned"
                    );
                    continue;
                }
            },
        };

        let eligible_positions = child(node, "eligible_positions")
            .map(|ep| {
                ep.children()
                    .filter(|c| is(c, "position"))
                    .filter_map(|p| p.text())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        players.push(WaiverPlayer {
            player_key: fields.player_key.to_string(),
            player_id: fields.player_id.to_string(),
            full_name: fields.full_name.to_string(),
            editorial_team_abbr: fields.editorial_team_abbr.to_string(),
            display_position: fields.display_position.to_string(),
            eligible_positions,
            image_url: path_text(node, &["headshot", "url"]).map(str::to_string),
            percent_owned,
        });
    }

    Ok(players)
}

// ─── Teams and rosters ───────────────────────────────────────────────────────

/// Parse every `<team>` (key and name) in a document.
pub fn parse_teams(xml: &str) -> Result<Vec<YahooTeam>, AppError> {
    let doc = parse_document(xml)?;
    Ok(elements(&doc, "team")
        .filter_map(|node| {
            Some(YahooTeam {
                team_key: child_text(node, "team_key")?.to_string(),
                name: child_text(node, "name").unwrap_or_default().to_string(),
            })
        })
        .collect())
}

/// Parse a `team/{key}/roster/players` document.
///
/// `local_player_id` is left empty for the caller to fill in.
pub fn parse_roster(xml: &str) -> Result<TeamRoster, AppError> {
    let doc = parse_document(xml)?;
    let team = elements(&doc, "team")
        .next()
        .ok_or_else(|| AppError::UpstreamParse("Roster response has no team".to_string()))?;

    let team_key = child_text(team, "team_key")
        .ok_or_else(|| AppError::UpstreamParse("Roster team has no team_key".to_string()))?;

    let players = team
        .descendants()
        .filter(|n| is(n, "player"))
        .map(|node| {
            let fields = player_fields(node);
            RosterPlayer {
                player_key: fields.player_key.to_string(),
                player_id: fields.player_id.to_string(),
                full_name: fields.full_name.to_string(),
                editorial_team_abbr: fields.editorial_team_abbr.to_string(),
                display_position: fields.display_position.to_string(),
                selected_position: path_text(node, &["selected_position", "position"])
                    .map(str::to_string),
                local_player_id: None,
            }
        })
        .collect();

    Ok(TeamRoster {
        team_key: team_key.to_string(),
        team_name: child_text(team, "name").unwrap_or_default().to_string(),
        players,
    })
}
