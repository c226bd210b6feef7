//! # Verification Events

use serde::{Deserialize, Serialize};

/// The kind of event a topic carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Card,
    Fingerprint,
}

impl EventKind {
    /// Short label for logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Card => "card",
            EventKind::Fingerprint => "fingerprint",
        }
    }
}

/// A structurally valid identity-verification event from a field reader.
///
/// Constructed from exactly one inbound message and consumed by one
/// pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationEvent {
    /// Badge swipe.
    Card { reader_id: i64, credential_id: String },
    /// Fingerprint scan matched by the reader to an enrolled template.
    Fingerprint { reader_id: i64, template_id: i64 },
}

impl VerificationEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            VerificationEvent::Card { .. } => EventKind::Card,
            VerificationEvent::Fingerprint { .. } => EventKind::Fingerprint,
        }
    }

    /// Reader that produced the event.
    #[must_use]
    pub fn reader_id(&self) -> i64 {
        match self {
            VerificationEvent::Card { reader_id, .. }
            | VerificationEvent::Fingerprint { reader_id, .. } => *reader_id,
        }
    }
}
