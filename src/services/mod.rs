// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod crypto;
pub mod password;
pub mod player_data;
pub mod trade;
pub mod yahoo;
pub mod yahoo_xml;

pub use crypto::TokenCipher;
pub use player_data::{IngestError, NflverseSyncReport, PlayerDataService, ValueSyncReport};
pub use yahoo::{TokenEndpointError, YahooClient, YahooService};
