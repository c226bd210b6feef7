//! # Resolution Errors
//!
//! Every variant denies access. They stay distinct so reports can tell
//! "nobody enrolled" apart from "could not ask".

use shared_types::{KeyError, StoreError};
use thiserror::Error;

use super::entities::Lookup;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// No identity matches the credential or template.
    #[error("No identity found for {0}")]
    NotFound(Lookup),

    /// The identity store could not be read.
    #[error("Identity store unavailable: {0}")]
    StoreUnavailable(StoreError),

    /// The presented credential cannot be used as a store key.
    #[error("Credential rejected before lookup: {0}")]
    InvalidKey(KeyError),

    /// A stored record exists but cannot be read as an identity.
    #[error("Corrupt identity record at {key}: {reason}")]
    CorruptRecord { key: String, reason: String },
}

impl ResolutionError {
    /// True for the plain "nobody enrolled" case.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolutionError::NotFound(_))
    }

    /// Stable label for metrics and structured logs.
    #[must_use]
    pub fn outcome_label(&self) -> &'static str {
        match self {
            ResolutionError::NotFound(_) => "not_found",
            ResolutionError::StoreUnavailable(_) => "store_unavailable",
            ResolutionError::InvalidKey(_) => "invalid_key",
            ResolutionError::CorruptRecord { .. } => "corrupt_record",
        }
    }
}

impl From<StoreError> for ResolutionError {
    fn from(err: StoreError) -> Self {
        ResolutionError::StoreUnavailable(err)
    }
}
