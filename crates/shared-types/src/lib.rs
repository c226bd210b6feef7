//! # Shared Types Crate
//!
//! Domain entities and error types shared by the SmartGuard subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Identity, attendance and key types are
//!   defined once here and used by every subsystem and adapter.
//! - **Path-safe keys**: `CredentialKey` and `SessionKey` can only be built
//!   from strings that stay inside one store path segment.
//! - **Read-only identities**: `IdentityRecord` is owned by the identity
//!   store; subsystems never write it back.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
