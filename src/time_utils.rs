// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::Utc;

/// Current time as Unix seconds.
///
/// Token expiries, JWT claims and OAuth state timestamps all use this scale.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
