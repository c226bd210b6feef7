//! # Identity Resolution Service
//!
//! Application service layer that implements the `IdentityResolutionApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`IdentityResolutionApi`)
//! - Reads through the outbound port (`IdentityStore`)
//! - Delegates template matching to the domain layer

use async_trait::async_trait;
use serde_json::Value;
use shared_types::{CredentialKey, IdentityRecord};
use tracing::debug;

use crate::domain::entities::{Lookup, ResolvedIdentity};
use crate::domain::errors::ResolutionError;
use crate::domain::scan::find_template_owner;
use crate::ports::inbound::IdentityResolutionApi;
use crate::ports::outbound::IdentityStore;

/// Identity Resolution Service.
pub struct IdentityResolver<S: IdentityStore> {
    store: S,
}

impl<S: IdentityStore> IdentityResolver<S> {
    /// Create a new resolver reading from `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store port.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: IdentityStore> IdentityResolutionApi for IdentityResolver<S> {
    async fn resolve_by_credential(
        &self,
        credential_id: &str,
    ) -> Result<ResolvedIdentity, ResolutionError> {
        let credential_key =
            CredentialKey::parse(credential_id).map_err(ResolutionError::InvalidKey)?;

        let raw = self
            .store
            .fetch_identity(&credential_key)
            .await?
            .ok_or_else(|| ResolutionError::NotFound(Lookup::Credential(credential_id.into())))?;

        let record = decode_record(&credential_key, raw)?;
        debug!(credential = %credential_key, "Identity resolved by credential");
        Ok(ResolvedIdentity {
            credential_key,
            record,
        })
    }

    async fn resolve_by_fingerprint(
        &self,
        template_id: i64,
    ) -> Result<ResolvedIdentity, ResolutionError> {
        let not_found = || ResolutionError::NotFound(Lookup::Template(template_id));

        let collection = self
            .store
            .fetch_all_identities()
            .await?
            .ok_or_else(not_found)?;

        let (key, raw) = find_template_owner(&collection, template_id)?.ok_or_else(not_found)?;

        let credential_key =
            CredentialKey::parse(key.as_str()).map_err(|e| ResolutionError::CorruptRecord {
                key: key.clone(),
                reason: e.to_string(),
            })?;
        let record = decode_record(&credential_key, raw.clone())?;
        debug!(credential = %credential_key, template_id, "Identity resolved by fingerprint");
        Ok(ResolvedIdentity {
            credential_key,
            record,
        })
    }
}

fn decode_record(key: &CredentialKey, raw: Value) -> Result<IdentityRecord, ResolutionError> {
    serde_json::from_value(raw).map_err(|e| ResolutionError::CorruptRecord {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
