// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fantasy Sports API: fantasy-football backend
//!
//! This crate provides local accounts, Yahoo Fantasy account linking and
//! proxying, and a trade analyzer backed by player values ingested from
//! nflverse and FantasyCalc.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::YahooService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub yahoo_service: YahooService,
}

impl AppState {
    /// Wire up services for a connected database.
    pub fn new(config: Config, db: Database) -> Result<Self, error::AppError> {
        let cipher = services::TokenCipher::new(&config.secret_key)?;
        let client = services::YahooClient::new(&config);
        let yahoo_service = YahooService::new(client, db.clone(), cipher);

        Ok(Self {
            config,
            db,
            yahoo_service,
        })
    }
}
