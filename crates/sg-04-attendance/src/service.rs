//! # Attendance Service
//!
//! Application service implementing `AttendanceApi` over a `SessionStore`
//! and a `TimeSource`.

use async_trait::async_trait;
use shared_types::{AttendanceEntry, CredentialKey, IdentityRecord, StoreError, VerificationMethod};
use tracing::debug;

use crate::domain::elapsed::elapsed_millis;
use crate::domain::entities::AttendanceReceipt;
use crate::domain::errors::AttendanceError;
use crate::domain::session::{active_session_key, session_start};
use crate::ports::inbound::AttendanceApi;
use crate::ports::outbound::{SessionStore, SystemTimeSource, TimeSource};

/// Attendance Recording Service.
pub struct AttendanceRecorder<S: SessionStore, T: TimeSource = SystemTimeSource> {
    store: S,
    clock: T,
}

impl<S: SessionStore> AttendanceRecorder<S, SystemTimeSource> {
    /// Create a recorder on the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemTimeSource)
    }
}

impl<S: SessionStore, T: TimeSource> AttendanceRecorder<S, T> {
    pub fn with_clock(store: S, clock: T) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn unavailable(stage: &'static str) -> impl FnOnce(StoreError) -> AttendanceError {
    move |error| AttendanceError::RecordingStoreUnavailable { stage, error }
}

#[async_trait]
impl<S: SessionStore, T: TimeSource> AttendanceApi for AttendanceRecorder<S, T> {
    async fn record(
        &self,
        credential_key: &CredentialKey,
        identity: &IdentityRecord,
        method: VerificationMethod,
    ) -> Result<AttendanceReceipt, AttendanceError> {
        let pointer = self
            .store
            .active_session_key()
            .await
            .map_err(unavailable("read active session"))?;
        let session_key = active_session_key(pointer)?;

        let session = self
            .store
            .fetch_session(&session_key)
            .await
            .map_err(unavailable("read session"))?
            .ok_or_else(|| AttendanceError::SessionNotFound(session_key.to_string()))?;
        let started = session_start(&session_key, &session)?;

        let elapsed_ms = elapsed_millis(started, self.clock.now());
        let entry = AttendanceEntry::new(method, identity, elapsed_ms);

        self.store
            .write_attendance(&session_key, credential_key, &entry)
            .await
            .map_err(unavailable("write attendance"))?;

        debug!(
            session = %session_key,
            credential = %credential_key,
            elapsed_ms,
            "Attendance entry written"
        );
        Ok(AttendanceReceipt {
            session_key,
            credential_key: credential_key.clone(),
            elapsed_ms,
            entry,
        })
    }
}
