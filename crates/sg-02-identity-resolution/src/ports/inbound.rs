//! # Inbound Port - IdentityResolutionApi
//!
//! Primary driving port used by the event router.

use async_trait::async_trait;

use crate::domain::entities::ResolvedIdentity;
use crate::domain::errors::ResolutionError;

/// Primary API for the Identity Resolution subsystem.
#[async_trait]
pub trait IdentityResolutionApi: Send + Sync {
    /// Resolve a badge swipe by its credential code.
    ///
    /// # Errors
    /// - `InvalidKey`: the code cannot be a store key (no lookup happens)
    /// - `NotFound`: nothing stored under the code
    /// - `StoreUnavailable`: the store read failed
    /// - `CorruptRecord`: the stored value is not an identity
    async fn resolve_by_credential(
        &self,
        credential_id: &str,
    ) -> Result<ResolvedIdentity, ResolutionError>;

    /// Resolve a fingerprint scan by scanning every identity's templates.
    ///
    /// Returns the first identity, in store order, whose `fprints` entry for
    /// `template_id` is `true`, together with its credential key.
    async fn resolve_by_fingerprint(
        &self,
        template_id: i64,
    ) -> Result<ResolvedIdentity, ResolutionError>;
}
