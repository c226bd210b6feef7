//! # Identity Store Adapter
//!
//! Implements the SG-02 `IdentityStore` port over the key-value store.
//!
//! Layout: `users/students/{credentialKey}` holds one identity record.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sg_02_identity_resolution::IdentityStore;
use shared_types::{CredentialKey, StoreError};

use super::storage::{store_path, KeyValueStore};

/// Root of the identity collection.
pub const STUDENTS_PATH: &str = "users/students";

/// Adapter connecting identity resolution to the store.
#[derive(Clone)]
pub struct StoreIdentityAdapter {
    store: Arc<dyn KeyValueStore>,
}

impl StoreIdentityAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityStore for StoreIdentityAdapter {
    async fn fetch_identity(&self, key: &CredentialKey) -> Result<Option<Value>, StoreError> {
        self.store
            .get(&store_path(&[STUDENTS_PATH, key.as_str()]))
            .await
    }

    async fn fetch_all_identities(&self) -> Result<Option<Value>, StoreError> {
        self.store.get(STUDENTS_PATH).await
    }
}
