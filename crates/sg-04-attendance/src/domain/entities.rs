//! # Attendance Entities

use shared_types::{AttendanceEntry, CredentialKey, SessionKey};

/// What was written, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceReceipt {
    pub session_key: SessionKey,
    pub credential_key: CredentialKey,
    pub elapsed_ms: i64,
    pub entry: AttendanceEntry,
}
