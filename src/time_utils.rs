// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Seconds since the Unix epoch, clamped at zero (JWT `NumericDate`).
pub fn unix_seconds(date: DateTime<Utc>) -> u64 {
    u64::try_from(date.timestamp()).unwrap_or(0)
}
