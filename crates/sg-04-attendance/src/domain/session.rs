//! # Session Decoding
//!
//! Turns the raw store values for the active-session pointer and the session
//! node into typed values, classifying every way they can be wrong.

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared_types::SessionKey;

use super::elapsed::parse_session_start;
use super::errors::AttendanceError;

/// Field of a session node holding its start timestamp.
pub const STARTED_FIELD: &str = "started";

/// Interpret the value at `sessions/active/firebaseKey`.
///
/// Absent, empty or non-string means there is no active session. A pointer
/// that cannot be a store key cannot name an existing session.
pub fn active_session_key(pointer: Option<Value>) -> Result<SessionKey, AttendanceError> {
    let raw = match pointer {
        Some(Value::String(raw)) if !raw.trim().is_empty() => raw,
        _ => return Err(AttendanceError::NoActiveSession),
    };
    SessionKey::parse(raw.as_str()).map_err(|_| AttendanceError::SessionNotFound(raw))
}

/// Extract and parse the start instant of the session stored at `key`.
pub fn session_start(key: &SessionKey, session: &Value) -> Result<DateTime<Utc>, AttendanceError> {
    let started = match session.get(STARTED_FIELD) {
        None | Some(Value::Null) => {
            return Err(AttendanceError::MissingStartTime(key.to_string()))
        }
        Some(Value::String(text)) => text,
        Some(other) => {
            return Err(AttendanceError::MalformedTimestamp {
                session: key.to_string(),
                value: other.to_string(),
                reason: "not a string".into(),
            })
        }
    };

    parse_session_start(started).map_err(|e| AttendanceError::MalformedTimestamp {
        session: key.to_string(),
        value: started.clone(),
        reason: e.to_string(),
    })
}
