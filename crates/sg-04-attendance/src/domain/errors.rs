//! # Attendance Errors

use shared_types::StoreError;
use thiserror::Error;

/// Why an attendance entry was not recorded.
///
/// None of these revoke an unlock that already happened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("No active session")]
    NoActiveSession,

    #[error("Session {0:?} not found")]
    SessionNotFound(String),

    #[error("Session {0:?} has no start time")]
    MissingStartTime(String),

    #[error("Session {session:?} start time {value:?} is malformed: {reason}")]
    MalformedTimestamp {
        session: String,
        value: String,
        reason: String,
    },

    #[error("Attendance store unavailable while trying to {stage}: {error}")]
    RecordingStoreUnavailable {
        stage: &'static str,
        error: StoreError,
    },
}

impl AttendanceError {
    /// Label for the `result` dimension of the attendance counter.
    #[must_use]
    pub fn outcome_label(&self) -> &'static str {
        match self {
            AttendanceError::NoActiveSession => "no_active_session",
            AttendanceError::SessionNotFound(_) => "session_not_found",
            AttendanceError::MissingStartTime(_) => "missing_start_time",
            AttendanceError::MalformedTimestamp { .. } => "malformed_timestamp",
            AttendanceError::RecordingStoreUnavailable { .. } => "store_unavailable",
        }
    }

    /// Whether this needs operator attention rather than routine session setup.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            AttendanceError::MalformedTimestamp { .. }
                | AttendanceError::RecordingStoreUnavailable { .. }
        )
    }
}
