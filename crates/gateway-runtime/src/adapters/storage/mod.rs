//! # Store Adapters
//!
//! The identity and session data live in one hierarchical key-value store.
//! Everything above this module sees it through [`KeyValueStore`].
//!
//! ## Backends
//!
//! - [`RealtimeDbStore`]: realtime database REST interface (production)
//! - [`InMemoryStore`]: process-local JSON tree (tests, `memory` mode)
//! - [`DisconnectedStore`]: no backend configured; every call is unavailable

pub mod memory;
pub mod realtime_db;

pub use memory::InMemoryStore;
pub use realtime_db::RealtimeDbStore;

use async_trait::async_trait;
use serde_json::Value;
use shared_types::StoreError;

/// Hierarchical key-value store.
///
/// Paths are `/`-separated segment lists without leading or trailing
/// slashes, e.g. `users/students/A1B2C3`. Callers are responsible for the
/// segments being path-safe.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value at `path`. `Ok(None)` when nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Overwrite the value at `path`. Writing `null` deletes it.
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Cheap reachability probe used at bootstrap.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Join path segments into a store path.
pub fn store_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Placeholder backend used when no store location is configured.
#[derive(Debug, Clone, Default)]
pub struct DisconnectedStore;

impl DisconnectedStore {
    fn unavailable() -> StoreError {
        StoreError::Unavailable("no store configured (set SG_STORE_URL)".into())
    }
}

#[async_trait]
impl KeyValueStore for DisconnectedStore {
    async fn get(&self, _path: &str) -> Result<Option<Value>, StoreError> {
        Err(Self::unavailable())
    }

    async fn set(&self, _path: &str, _value: Value) -> Result<(), StoreError> {
        Err(Self::unavailable())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(Self::unavailable())
    }
}
