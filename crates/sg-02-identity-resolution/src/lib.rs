//! # Identity Resolution Subsystem (SG-02)
//!
//! Finds the enrolled identity behind a presented credential.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Template scan and error types, no I/O
//! - **Ports Layer** (`ports/`): `IdentityResolutionApi` in, `IdentityStore` out
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Lookups
//!
//! - **By credential**: point read of `users/students/{credentialKey}`.
//! - **By fingerprint**: reads the whole identity collection and returns the
//!   first record whose `fprints` claims the template id. At most one
//!   identity should claim a template; this is assumed, not enforced.
//!
//! Records are re-fetched on every event. Nothing is cached.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::entities::{Lookup, ResolvedIdentity};
pub use domain::errors::ResolutionError;
pub use domain::scan::{find_template_owner, template_claimed};
pub use ports::inbound::IdentityResolutionApi;
pub use ports::outbound::IdentityStore;
pub use service::IdentityResolver;
