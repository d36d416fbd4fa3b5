// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trade analyzer route.

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{TradeAnalysis, TradeRequest};
use crate::services::trade;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/trade/analyze", post(analyze_trade))
}

async fn analyze_trade(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TradeRequest>,
) -> Result<Json<TradeAnalysis>> {
    let analysis = trade::analyze(&state.db, &request).await?;
    Ok(Json(analysis))
}
