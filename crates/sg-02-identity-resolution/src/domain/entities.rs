//! # Resolution Entities

use std::fmt;

use shared_types::{CredentialKey, IdentityRecord};

/// What was looked up, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Direct lookup by RFID/badge code.
    Credential(String),
    /// Collection scan by fingerprint template id.
    Template(i64),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Credential(code) => write!(f, "credential {code}"),
            Lookup::Template(id) => write!(f, "fingerprint template {id}"),
        }
    }
}

/// An identity together with the credential key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub credential_key: CredentialKey,
    pub record: IdentityRecord,
}
