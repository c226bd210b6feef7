//! # Access Decisions

use std::fmt;

use shared_types::IdentityRecord;

/// Fixed payload the lock controller treats as "open".
pub const UNLOCK_ACKNOWLEDGMENT: &[u8] = b"OK";

/// Instruction to open the physical lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockDirective;

impl UnlockDirective {
    /// Bytes published to the unlock topic.
    #[must_use]
    pub fn payload(&self) -> &'static [u8] {
        UNLOCK_ACKNOWLEDGMENT
    }
}

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The identity exists but its `registered` flag is not set.
    NotRegistered,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::NotRegistered => f.write_str("identity is not registered"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow(UnlockDirective),
    Deny(DenialReason),
}

impl AccessDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow(_))
    }
}

/// A pure access policy.
pub trait AccessPolicy: Send + Sync {
    fn decide(&self, identity: &IdentityRecord) -> AccessDecision;
}

/// Allows exactly the identities whose `registered` flag is `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationPolicy;

impl AccessPolicy for RegistrationPolicy {
    fn decide(&self, identity: &IdentityRecord) -> AccessDecision {
        if identity.registered {
            AccessDecision::Allow(UnlockDirective)
        } else {
            AccessDecision::Deny(DenialReason::NotRegistered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(registered: bool) -> IdentityRecord {
        IdentityRecord {
            name: "Jane Doe".into(),
            registered,
            ..Default::default()
        }
    }

    #[test]
    fn test_registered_identity_is_allowed() {
        let decision = RegistrationPolicy.decide(&identity(true));
        assert_eq!(decision, AccessDecision::Allow(UnlockDirective));
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_unregistered_identity_is_denied() {
        let decision = RegistrationPolicy.decide(&identity(false));
        assert_eq!(decision, AccessDecision::Deny(DenialReason::NotRegistered));
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_unlock_payload_is_ok_token() {
        assert_eq!(UnlockDirective.payload(), b"OK");
    }
}
