//! # Outbound Ports (Driven Ports / SPI)
//!
//! The identity store this subsystem reads from.

use async_trait::async_trait;
use serde_json::Value;
use shared_types::{CredentialKey, StoreError};

/// Read-only view of the identity collection.
///
/// Values are returned raw; decoding and matching are domain concerns.
/// `Ok(None)` means the path holds nothing.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fetch the record stored under one credential key.
    async fn fetch_identity(&self, key: &CredentialKey) -> Result<Option<Value>, StoreError>;

    /// Fetch the entire identity collection.
    async fn fetch_all_identities(&self) -> Result<Option<Value>, StoreError>;
}

/// Mock identity store for testing.
#[cfg(test)]
pub struct MockIdentityStore {
    pub collection: Value,
    pub failure: Option<StoreError>,
    pub reads: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockIdentityStore {
    pub fn new(collection: Value) -> Self {
        Self {
            collection,
            failure: None,
            reads: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn failing(error: StoreError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(Value::Null)
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn read(&self) -> Result<(), StoreError> {
        self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl IdentityStore for MockIdentityStore {
    async fn fetch_identity(&self, key: &CredentialKey) -> Result<Option<Value>, StoreError> {
        self.read()?;
        Ok(self.collection.get(key.as_str()).cloned())
    }

    async fn fetch_all_identities(&self) -> Result<Option<Value>, StoreError> {
        self.read()?;
        Ok(match &self.collection {
            Value::Null => None,
            other => Some(other.clone()),
        })
    }
}
