//! # Core Domain Entities
//!
//! Entities shared by every SmartGuard subsystem.
//!
//! ## Clusters
//!
//! - **Keys**: `CredentialKey`, `SessionKey`
//! - **Identity**: `IdentityRecord` (read-only, owned by the identity store)
//! - **Attendance**: `AttendanceEntry`, `VerificationMethod`

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::KeyError;

/// Placeholder shown for identity fields the store left empty.
pub const NOT_AVAILABLE: &str = "N/A";

// =============================================================================
// KEYS
// =============================================================================

/// Characters the hierarchical store reserves inside a key segment.
const RESERVED_KEY_CHARS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

fn check_segment(raw: &str) -> Result<(), KeyError> {
    if raw.is_empty() {
        return Err(KeyError::Empty);
    }
    if let Some(c) = raw
        .chars()
        .find(|c| RESERVED_KEY_CHARS.contains(c) || c.is_control())
    {
        return Err(KeyError::ReservedCharacter {
            key: raw.to_string(),
            character: c,
        });
    }
    Ok(())
}

/// The RFID/badge code; primary key of an identity.
///
/// Always a single, path-safe store segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CredentialKey(String);

impl CredentialKey {
    /// Parse a credential key, rejecting anything that could escape its
    /// path segment in the store.
    pub fn parse(raw: impl Into<String>) -> Result<Self, KeyError> {
        let raw = raw.into();
        check_segment(&raw)?;
        Ok(Self(raw))
    }

    /// The key as it appears in store paths.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key naming one attendance session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Parse a session key with the same segment rules as credential keys.
    pub fn parse(raw: impl Into<String>) -> Result<Self, KeyError> {
        let raw = raw.into();
        check_segment(&raw)?;
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// One enrolled person, as stored under `users/students/{credentialKey}`.
///
/// Display fields default to empty when absent. `student_id` and
/// `year_level` are sometimes stored as numbers and are carried as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    #[serde(default, deserialize_with = "text_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub student_id: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub course: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub year_level: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub email: String,
    /// Access policy gate.
    #[serde(default)]
    pub registered: bool,
    /// Fingerprint template id (decimal text) -> "belongs to this identity".
    #[serde(default, deserialize_with = "fingerprint_map")]
    pub fprints: BTreeMap<String, bool>,
}

impl IdentityRecord {
    /// Template ids this identity claims, in key order.
    #[must_use]
    pub fn claimed_templates(&self) -> Vec<&str> {
        self.fprints
            .iter()
            .filter(|(_, claimed)| **claimed)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// A display field, or `N/A` when the store left it empty.
    #[must_use]
    pub fn display(field: &str) -> &str {
        if field.is_empty() {
            NOT_AVAILABLE
        } else {
            field
        }
    }
}

/// Display data: text is kept, numbers become their decimal text, anything
/// else reads as empty.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

/// Integer-keyed maps may come back from the store as sparse arrays, where
/// the index is the template id. Both shapes collapse to the same mapping.
/// Only boolean claims are kept.
fn fingerprint_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(id, claimed)| claimed.as_bool().map(|c| (id, c)))
            .collect(),
        Some(Value::Array(list)) => list
            .into_iter()
            .enumerate()
            .filter_map(|(id, claimed)| claimed.as_bool().map(|c| (id.to_string(), c)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

// =============================================================================
// ATTENDANCE
// =============================================================================

/// How a credential was presented at the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationMethod {
    #[serde(rename = "RFID")]
    Rfid,
    #[serde(rename = "Fingerprint")]
    Fingerprint,
}

impl VerificationMethod {
    /// Label written into attendance entries.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMethod::Rfid => "RFID",
            VerificationMethod::Fingerprint => "Fingerprint",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry under `sessions/{key}/attendance/{credentialKey}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub method: VerificationMethod,
    pub name: String,
    #[serde(rename = "studentId")]
    pub student_id: String,
    /// Milliseconds since session start, as decimal text. May be negative
    /// when the session start lies in the future (clock skew is not corrected).
    #[serde(rename = "timeIn")]
    pub time_in: String,
}

impl AttendanceEntry {
    /// Build the entry for an identity admitted `elapsed_ms` after session start.
    #[must_use]
    pub fn new(method: VerificationMethod, identity: &IdentityRecord, elapsed_ms: i64) -> Self {
        Self {
            method,
            name: identity.name.clone(),
            student_id: identity.student_id.clone(),
            time_in: elapsed_ms.to_string(),
        }
    }
}
