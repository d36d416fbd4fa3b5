// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Yahoo Fantasy Sports API client and account service.
//!
//! Handles:
//! - OAuth2 authorization URL, code exchange and token refresh
//! - Encrypted token storage with an in-memory access-token cache
//! - League, waiver-wire and roster fetches (XML, see `yahoo_xml`)
//! - Rate limit and rejected-token detection

use crate::error::AppError;
use serde::Deserialize;

/// Yahoo API client.
#[derive(Clone)]
pub struct YahooClient {
    http: reqwest::Client,
    api_base_url: String,
    oauth_base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl YahooClient {
    pub fn new(config: &crate::config::Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: config.yahoo_api_base_url.trim_end_matches('/').to_string(),
            oauth_base_url: config.yahoo_oauth_base_url.trim_end_matches('/').to_string(),
            client_id: config.yahoo_client_id.clone(),
            client_secret: config.yahoo_client_secret.clone(),
            redirect_uri: config.yahoo_redirect_uri.clone(),
        }
    }

    /// URL the user is sent to in order to grant access.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}/oauth2/request_auth?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             state={}",
            self.oauth_base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, TokenEndpointError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, TokenEndpointError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    /// POST to the token endpoint with HTTP Basic client authentication.
    async fn token_request(
        &self,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, TokenEndpointError> {
        let response = self
            .http
            .post(format!("{}/oauth2/get_token", self.oauth_base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| TokenEndpointError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Yahoo token endpoint rejected request");
            return Err(TokenEndpointError::Rejected(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| TokenEndpointError::Malformed(e.to_string()))
    }

    /// GET a Fantasy API resource and return the XML body.
    ///
    /// `path` is appended to the API base and must start with `/`.
    pub async fn get_xml(&self, access_token: &str, path: &str) -> Result<String, AppError> {
        let url = format!("{}{}", self.api_base_url, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::YahooApi(e.to_string()))?;

        let response = self.check_response(response).await?;
        response
            .text()
            .await
            .map_err(|e| AppError::YahooApi(format!("Failed to read response body: {}", e)))
    }

    /// Check response status and return error if not successful.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();

        if status.as_u16() == 429 {
            tracing::warn!("Yahoo rate limit hit (429)");
            return Err(AppError::YahooApi(AppError::YAHOO_RATE_LIMIT.to_string()));
        }

        if status.as_u16() == 401 {
            return Err(AppError::YahooApi(AppError::YAHOO_TOKEN_REJECTED.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %body, "Yahoo API error");
        Err(AppError::YahooApi(format!("HTTP {}", status.as_u16())))
    }
}

/// Token endpoint response.
///
/// Yahoo sometimes omits `refresh_token` on refresh; the old one stays valid.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

/// Failure at the token endpoint, kept apart from API errors so callers can
/// tell an invalid grant from a transport problem.
#[derive(Debug, thiserror::Error)]
pub enum TokenEndpointError {
    #[error("Yahoo token endpoint returned HTTP {0}")]
    Rejected(u16),
    #[error("Token request failed: {0}")]
    Transport(String),
    #[error("Failed to parse token response: {0}")]
    Malformed(String),
}

impl TokenEndpointError {
    /// Only 400 (invalid_grant) and 401 (bad client or revoked token) mean the
    /// stored refresh token is dead.
    pub fn is_grant_rejection(&self) -> bool {
        matches!(self, TokenEndpointError::Rejected(400 | 401))
    }
}

impl From<TokenEndpointError> for AppError {
    fn from(err: TokenEndpointError) -> Self {
        AppError::YahooApi(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// YahooService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::{self, Database};
use crate::models::{PlayerStatus, TeamRoster, WaiverPlayer, YahooLeague, YahooTokens};
use crate::services::crypto::TokenCipher;
use crate::services::yahoo_xml;
use crate::time_utils::unix_now;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Cached access token with expiry information.
#[derive(Clone)]
pub struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Shared token cache type, keyed by local user id.
pub type TokenCache = Arc<DashMap<i64, CachedToken>>;

/// Shared refresh locks type, keyed by local user id.
pub type RefreshLocks = Arc<DashMap<i64, Arc<Mutex<()>>>>;

/// High-level Yahoo service that manages token lifecycle and API calls.
#[derive(Clone)]
pub struct YahooService {
    client: YahooClient,
    db: Database,
    cipher: TokenCipher,
    /// In-memory cache of decrypted access tokens (shared across requests).
    token_cache: TokenCache,
    /// Per-user mutex to serialize token refresh operations.
    refresh_locks: RefreshLocks,
}

impl YahooService {
    pub fn new(client: YahooClient, db: Database, cipher: TokenCipher) -> Self {
        Self {
            client,
            db,
            cipher,
            token_cache: Arc::new(DashMap::new()),
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn authorization_url(&self, state: &str) -> String {
        self.client.authorization_url(state)
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a valid (non-expiring) access token for the given user.
    ///
    /// Checks the cache, then takes the per-user lock and re-checks before
    /// reading the database. Tokens within five minutes of expiry are
    /// refreshed with Yahoo and stored again.
    pub async fn get_valid_access_token(&self, user_id: i64) -> Result<String, AppError> {
        if let Some(token) = self.cached_token(user_id) {
            return Ok(token);
        }

        let lock = self
            .refresh_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another task may have refreshed while we were waiting.
        if let Some(token) = self.cached_token(user_id) {
            return Ok(token);
        }

        let tokens = db::tokens::get(self.db.pool(), user_id)
            .await?
            .ok_or(AppError::YahooNotLinked)?;

        if unix_now() + TOKEN_REFRESH_MARGIN_SECS < tokens.expires_at {
            let access_token = self.cipher.decrypt(&tokens.access_token_encrypted, user_id)?;
            self.cache_token(user_id, &access_token, tokens.expires_at);
            return Ok(access_token);
        }

        tracing::info!(user_id, "Yahoo access token expiring, refreshing");
        let refresh_token = self.cipher.decrypt(&tokens.refresh_token_encrypted, user_id)?;

        let refreshed = match self.client.refresh_token(&refresh_token).await {
            Ok(t) => t,
            Err(e) if e.is_grant_rejection() => {
                tracing::warn!(user_id, error = %e, "Yahoo refused token refresh, relink required");
                return Err(AppError::YahooNotLinked);
            }
            Err(e) => return Err(e.into()),
        };

        let new_refresh = refreshed.refresh_token.as_deref().unwrap_or(&refresh_token);
        let expires_at = unix_now() + refreshed.expires_in;
        let (access_enc, refresh_enc) =
            self.cipher
                .encrypt_pair(&refreshed.access_token, new_refresh, user_id)?;

        db::tokens::upsert(
            self.db.pool(),
            &YahooTokens {
                user_id,
                access_token_encrypted: access_enc,
                refresh_token_encrypted: refresh_enc,
                token_type: refreshed.token_type.unwrap_or(tokens.token_type),
                expires_at,
            },
        )
        .await?;

        self.cache_token(user_id, &refreshed.access_token, expires_at);
        tracing::info!(user_id, "Yahoo token refreshed and cached");
        Ok(refreshed.access_token)
    }

    fn cached_token(&self, user_id: i64) -> Option<String> {
        let cached = self.token_cache.get(&user_id)?;
        (unix_now() + TOKEN_REFRESH_MARGIN_SECS < cached.expires_at)
            .then(|| cached.access_token.clone())
    }

    fn cache_token(&self, user_id: i64, access_token: &str, expires_at: i64) {
        self.token_cache.insert(
            user_id,
            CachedToken {
                access_token: access_token.to_string(),
                expires_at,
            },
        );
    }

    /// Drop the cached access token so the next call reads storage again.
    pub fn invalidate_cached_token(&self, user_id: i64) {
        self.token_cache.remove(&user_id);
    }

    // ─── Account Linking ─────────────────────────────────────────────────────

    /// Exchange an authorization code and store the user's tokens.
    pub async fn handle_oauth_callback(&self, user_id: i64, code: &str) -> Result<(), AppError> {
        let tokens = self.client.exchange_code(code).await.map_err(|e| {
            tracing::warn!(user_id, error = %e, "Yahoo code exchange failed");
            AppError::BadRequest(
                "Invalid authorization code or failed to exchange for token.".to_string(),
            )
        })?;

        let refresh_token = tokens.refresh_token.as_deref().ok_or_else(|| {
            AppError::YahooApi("Token response did not include a refresh token".to_string())
        })?;

        let expires_at = unix_now() + tokens.expires_in;
        let (access_enc, refresh_enc) =
            self.cipher
                .encrypt_pair(&tokens.access_token, refresh_token, user_id)?;

        db::tokens::upsert(
            self.db.pool(),
            &YahooTokens {
                user_id,
                access_token_encrypted: access_enc,
                refresh_token_encrypted: refresh_enc,
                token_type: tokens.token_type.unwrap_or_else(|| "bearer".to_string()),
                expires_at,
            },
        )
        .await?;

        self.cache_token(user_id, &tokens.access_token, expires_at);
        tracing::info!(user_id, "Yahoo account linked");
        Ok(())
    }

    pub async fn is_linked(&self, user_id: i64) -> Result<bool, AppError> {
        Ok(db::tokens::get(self.db.pool(), user_id).await?.is_some())
    }

    /// Forget the user's Yahoo tokens.
    pub async fn unlink(&self, user_id: i64) -> Result<(), AppError> {
        let existed = db::tokens::delete(self.db.pool(), user_id).await?;
        self.invalidate_cached_token(user_id);
        tracing::info!(user_id, existed, "Yahoo account unlinked");
        Ok(())
    }

    // ─── API Wrappers ────────────────────────────────────────────────────────

    /// Fetch a resource with the user's token, dropping the cached token if
    /// Yahoo rejects it.
    async fn fetch_xml(&self, user_id: i64, path: &str) -> Result<String, AppError> {
        let access_token = self.get_valid_access_token(user_id).await?;
        match self.client.get_xml(&access_token, path).await {
            Err(e) if e.requires_relink() => {
                tracing::warn!(user_id, "Yahoo rejected cached access token");
                self.invalidate_cached_token(user_id);
                Err(e)
            }
            other => other,
        }
    }

    /// The user's NFL leagues, also saved as local league rows.
    pub async fn leagues(&self, user_id: i64) -> Result<Vec<YahooLeague>, AppError> {
        let xml = self
            .fetch_xml(user_id, "/users;use_login=1/games;game_keys=nfl/leagues;out=settings")
            .await?;
        let leagues = yahoo_xml::parse_leagues(&xml)?;

        let mut tx = self.db.begin().await?;
        for league in &leagues {
            db::leagues::upsert(&mut *tx, league, user_id).await?;
        }
        tx.commit().await?;

        tracing::debug!(user_id, count = leagues.len(), "Fetched Yahoo leagues");
        Ok(leagues)
    }

    /// Players in a league filtered by availability.
    pub async fn waiver_players(
        &self,
        user_id: i64,
        league_key: &str,
        status: PlayerStatus,
    ) -> Result<Vec<WaiverPlayer>, AppError> {
        validate_league_key(league_key)?;
        let path = format!(
            "/league/{}/players;status={}/stats",
            league_key,
            status.as_str()
        );
        let xml = self.fetch_xml(user_id, &path).await?;
        let players = yahoo_xml::parse_waiver_players(&xml)?;

        tracing::debug!(
            user_id,
            league_key,
            status = status.as_str(),
            count = players.len(),
            "Fetched waiver wire"
        );
        Ok(players)
    }

    /// The user's roster in a league, linked to local players.
    pub async fn roster(&self, user_id: i64, league_key: &str) -> Result<TeamRoster, AppError> {
        validate_league_key(league_key)?;

        let teams_xml = self
            .fetch_xml(user_id, "/users;use_login=1/games;game_keys=nfl/teams")
            .await?;
        let prefix = format!("{}.t.", league_key);
        let team = yahoo_xml::parse_teams(&teams_xml)?
            .into_iter()
            .find(|t| t.team_key.starts_with(&prefix))
            .ok_or_else(|| AppError::NotFound("League not found".to_string()))?;

        let roster_xml = self
            .fetch_xml(user_id, &format!("/team/{}/roster/players", team.team_key))
            .await?;
        let mut roster = yahoo_xml::parse_roster(&roster_xml)?;
        if roster.team_name.is_empty() {
            roster.team_name = team.name;
        }

        let league_id = match db::leagues::get_by_key(self.db.pool(), league_key).await? {
            Some(league) => league.id,
            None => self.fetch_and_store_league(user_id, league_key).await?,
        };

        let yahoo_ids: Vec<String> = roster
            .players
            .iter()
            .filter(|p| !p.player_id.is_empty())
            .map(|p| p.player_id.clone())
            .collect();

        let mut tx = self.db.begin().await?;
        let team_row =
            db::leagues::upsert_team(&mut *tx, league_id, &roster.team_key, &roster.team_name)
                .await?;
        let local_ids = db::players::ids_by_yahoo_ids(&mut *tx, &yahoo_ids).await?;
        let linked: Vec<i64> = yahoo_ids
            .iter()
            .filter_map(|id| local_ids.get(id).copied())
            .collect();
        db::leagues::replace_roster(&mut tx, team_row.id, &linked).await?;
        tx.commit().await?;

        for player in &mut roster.players {
            player.local_player_id = local_ids.get(&player.player_id).copied();
        }

        tracing::debug!(
            user_id,
            league_key,
            players = roster.players.len(),
            linked = linked.len(),
            "Fetched roster"
        );
        Ok(roster)
    }

    /// Fetch league metadata for a league not yet stored locally.
    async fn fetch_and_store_league(&self, user_id: i64, league_key: &str) -> Result<i64, AppError> {
        let xml = self
            .fetch_xml(user_id, &format!("/league/{}/settings", league_key))
            .await?;
        let league = yahoo_xml::parse_leagues(&xml)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::UpstreamParse("League metadata missing".to_string()))?;
        Ok(db::leagues::upsert(self.db.pool(), &league, user_id).await?.id)
    }
}

/// League keys look like `423.l.12345`. Anything else is refused before it
/// reaches a Yahoo URL path.
fn validate_league_key(league_key: &str) -> Result<(), AppError> {
    let valid = league_key
        .split_once(".l.")
        .map(|(game, league)| {
            !game.is_empty()
                && !league.is_empty()
                && game.chars().all(|c| c.is_ascii_alphanumeric())
                && league.chars().all(|c| c.is_ascii_digit())
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid league key: {}",
            league_key
        )))
    }
}
