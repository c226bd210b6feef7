//! # Session-Relative Time

use chrono::{DateTime, TimeDelta, Utc};

/// Parse a session `started` value as an absolute instant.
///
/// Accepts RFC 3339 timestamps, including the `Z` (Zulu) suffix and
/// fractional seconds, e.g. `2025-03-01T08:00:00.000Z`.
pub fn parse_session_start(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw.trim()).map(|instant| instant.with_timezone(&Utc))
}

/// Milliseconds from `start` to `now`, floored.
///
/// Negative when `start` lies after `now`; no clamping is applied.
#[must_use]
pub fn elapsed_millis(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    floor_millis(now.signed_duration_since(start))
}

fn floor_millis(delta: TimeDelta) -> i64 {
    // num_seconds and subsec_nanos both truncate toward zero and share a sign.
    delta.num_seconds() * 1_000 + i64::from(delta.subsec_nanos()).div_euclid(1_000_000)
}
