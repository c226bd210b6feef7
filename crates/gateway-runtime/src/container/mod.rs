//! # Gateway Container
//!
//! Configuration plus the lifecycle state decided at bootstrap.
//!
//! The router never reads ambient flags: whether the store was reachable at
//! startup is captured once in [`GatewayContext`] and handed to it.

pub mod config;

pub use config::{ConfigError, GatewayConfig, MqttConfig, StoreConfig, StoreMode, TopicConfig};

use std::sync::Arc;

use shared_types::StoreError;
use tracing::{error, info, warn};

use crate::adapters::{DisconnectedStore, InMemoryStore, KeyValueStore, RealtimeDbStore};

/// Store reachability as probed at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Available,
    /// Degraded mode: every resolution fails with `StoreUnavailable`.
    Unavailable,
}

/// Read-only state shared by the router and handlers.
#[derive(Debug, Clone)]
pub struct GatewayContext {
    pub config: GatewayConfig,
    pub store_status: StoreStatus,
}

impl GatewayContext {
    pub fn new(config: GatewayConfig, store_status: StoreStatus) -> Self {
        Self {
            config,
            store_status,
        }
    }

    pub fn store_available(&self) -> bool {
        self.store_status == StoreStatus::Available
    }
}

/// Build the configured store backend.
///
/// A realtime-db configuration without a URL yields a [`DisconnectedStore`].
pub fn build_store(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    match (config.mode, config.url.as_deref()) {
        (StoreMode::Memory, _) => {
            info!("Using in-memory store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        (StoreMode::RealtimeDb, Some(url)) => {
            let store = RealtimeDbStore::new(url, config.auth_token.clone())?;
            info!(url = %store.base_url(), "Using realtime database store");
            Ok(Arc::new(store))
        }
        (StoreMode::RealtimeDb, None) => {
            warn!("SG_STORE_URL is not set; no store available");
            Ok(Arc::new(DisconnectedStore))
        }
    }
}

/// Probe the store once. Failure degrades the gateway instead of stopping it.
pub async fn probe_store(store: &dyn KeyValueStore) -> StoreStatus {
    match store.ping().await {
        Ok(()) => {
            info!("Store reachable");
            StoreStatus::Available
        }
        Err(e) => {
            error!(error = %e, "Store unreachable; running in degraded mode, every lookup will fail");
            StoreStatus::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_is_available() {
        let store = build_store(&StoreConfig {
            mode: StoreMode::Memory,
            ..StoreConfig::default()
        })
        .unwrap();
        assert_eq!(probe_store(store.as_ref()).await, StoreStatus::Available);
    }

    #[tokio::test]
    async fn test_missing_url_degrades() {
        let store = build_store(&StoreConfig::default()).unwrap();
        assert_eq!(probe_store(store.as_ref()).await, StoreStatus::Unavailable);
    }

    #[test]
    fn test_invalid_url_is_error() {
        let result = build_store(&StoreConfig {
            mode: StoreMode::RealtimeDb,
            url: Some("not a url".into()),
            auth_token: None,
        });
        assert!(result.is_err());
    }
}
