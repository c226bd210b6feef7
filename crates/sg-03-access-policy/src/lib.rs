//! # Access Policy Subsystem (SG-03)
//!
//! Decides allow/deny for a resolved identity. Pure: no I/O, no state.
//!
//! `Allow` carries the `UnlockDirective` that the router publishes before
//! attendance is attempted. `Deny` is terminal and is reported, never
//! persisted.

pub mod domain;

pub use domain::decision::{
    AccessDecision, AccessPolicy, DenialReason, RegistrationPolicy, UnlockDirective,
    UNLOCK_ACKNOWLEDGMENT,
};
