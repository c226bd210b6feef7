//! # Inbound Port - AttendanceApi

use async_trait::async_trait;
use shared_types::{CredentialKey, IdentityRecord, VerificationMethod};

use crate::domain::entities::AttendanceReceipt;
use crate::domain::errors::AttendanceError;

/// Primary API for the Attendance subsystem.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    /// Record that `identity`, known under `credential_key`, was admitted now
    /// via `method`.
    ///
    /// Called only after the unlock has been published. Any error leaves the
    /// store unchanged.
    async fn record(
        &self,
        credential_key: &CredentialKey,
        identity: &IdentityRecord,
        method: VerificationMethod,
    ) -> Result<AttendanceReceipt, AttendanceError>;
}
