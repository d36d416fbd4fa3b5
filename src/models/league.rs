//! Locally cached Yahoo leagues and teams.

/// League row, keyed by the Yahoo league key.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct League {
    pub id: i64,
    /// Yahoo league key, e.g. `423.l.12345`
    pub yahoo_league_id: String,
    pub name: String,
    pub season: i64,
    /// "PPR" / "Half-PPR" / "Standard" when known
    pub scoring_type: Option<String>,
    pub url: Option<String>,
    pub owner_id: Option<i64>,
}

/// Fantasy team inside a league.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Team {
    pub id: i64,
    /// Yahoo team key, e.g. `423.l.12345.t.3`
    pub yahoo_team_id: String,
    pub name: String,
    pub league_id: i64,
}
