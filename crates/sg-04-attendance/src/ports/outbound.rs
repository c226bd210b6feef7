//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies this subsystem requires from the host.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use shared_types::{AttendanceEntry, CredentialKey, SessionKey, StoreError};

/// Session storage.
///
/// Reads return raw values; `Ok(None)` means the path holds nothing.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the active-session pointer (`sessions/active/firebaseKey`).
    async fn active_session_key(&self) -> Result<Option<Value>, StoreError>;

    /// Read one session node (`sessions/{key}`).
    async fn fetch_session(&self, key: &SessionKey) -> Result<Option<Value>, StoreError>;

    /// Write (overwrite) `sessions/{session}/attendance/{credential}`.
    async fn write_attendance(
        &self,
        session: &SessionKey,
        credential: &CredentialKey,
        entry: &AttendanceEntry,
    ) -> Result<(), StoreError>;
}

/// Wall-clock abstraction for deterministic testing.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock with millisecond resolution.
///
/// Used for replaying recorded traffic and in tests.
#[derive(Debug)]
pub struct FixedTimeSource {
    millis: AtomicI64,
}

impl FixedTimeSource {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: TimeDelta) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Mock session store for testing.
#[cfg(test)]
pub struct MockSessionStore {
    pub active: Option<Value>,
    pub sessions: serde_json::Map<String, Value>,
    pub read_failure: Option<StoreError>,
    pub write_failure: Option<StoreError>,
    pub writes: std::sync::Mutex<Vec<(SessionKey, CredentialKey, AttendanceEntry)>>,
}

#[cfg(test)]
impl MockSessionStore {
    pub fn new(active: Option<Value>, sessions: Value) -> Self {
        Self {
            active,
            sessions: match sessions {
                Value::Object(map) => map,
                _ => serde_json::Map::new(),
            },
            read_failure: None,
            write_failure: None,
            writes: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<(SessionKey, CredentialKey, AttendanceEntry)> {
        self.writes.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl SessionStore for MockSessionStore {
    async fn active_session_key(&self) -> Result<Option<Value>, StoreError> {
        if let Some(err) = &self.read_failure {
            return Err(err.clone());
        }
        Ok(self.active.clone())
    }

    async fn fetch_session(&self, key: &SessionKey) -> Result<Option<Value>, StoreError> {
        if let Some(err) = &self.read_failure {
            return Err(err.clone());
        }
        Ok(self.sessions.get(key.as_str()).cloned())
    }

    async fn write_attendance(
        &self,
        session: &SessionKey,
        credential: &CredentialKey,
        entry: &AttendanceEntry,
    ) -> Result<(), StoreError> {
        if let Some(err) = &self.write_failure {
            return Err(err.clone());
        }
        self.writes
            .lock()
            .unwrap()
            .push((session.clone(), credential.clone(), entry.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_time_source_advances() {
        let start = DateTime::from_timestamp_millis(1_740_816_000_000).unwrap();
        let clock = FixedTimeSource::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(TimeDelta::milliseconds(1_500));
        assert_eq!(clock.now().timestamp_millis(), 1_740_816_001_500);

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
