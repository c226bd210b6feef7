//! # Session Store Adapter
//!
//! Implements the SG-04 `SessionStore` port over the key-value store.
//!
//! Layout:
//! - `sessions/active/firebaseKey` names the active session
//! - `sessions/{key}` holds `started` and the `attendance` map
//! - `sessions/{key}/attendance/{credentialKey}` holds one entry

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sg_04_attendance::SessionStore;
use shared_types::{AttendanceEntry, CredentialKey, SessionKey, StoreError};

use super::storage::{store_path, KeyValueStore};

/// Root of all sessions.
pub const SESSIONS_PATH: &str = "sessions";

/// Pointer to the active session key.
pub const ACTIVE_SESSION_PATH: &str = "sessions/active/firebaseKey";

const ATTENDANCE_SEGMENT: &str = "attendance";

/// Adapter connecting attendance recording to the store.
#[derive(Clone)]
pub struct StoreSessionAdapter {
    store: Arc<dyn KeyValueStore>,
}

impl StoreSessionAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionStore for StoreSessionAdapter {
    async fn active_session_key(&self) -> Result<Option<Value>, StoreError> {
        self.store.get(ACTIVE_SESSION_PATH).await
    }

    async fn fetch_session(&self, key: &SessionKey) -> Result<Option<Value>, StoreError> {
        self.store
            .get(&store_path(&[SESSIONS_PATH, key.as_str()]))
            .await
    }

    async fn write_attendance(
        &self,
        session: &SessionKey,
        credential: &CredentialKey,
        entry: &AttendanceEntry,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(entry).map_err(|e| StoreError::Decode(e.to_string()))?;
        let path = store_path(&[
            SESSIONS_PATH,
            session.as_str(),
            ATTENDANCE_SEGMENT,
            credential.as_str(),
        ]);
        self.store.set(&path, value).await
    }
}
