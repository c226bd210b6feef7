//! # Message Validation Subsystem (SG-01)
//!
//! Turns a decoded reader payload into a typed `VerificationEvent`, or says
//! exactly which fields were missing or mistyped.
//!
//! ## Rules
//!
//! - **Fail closed**: every required field must be present with the exact
//!   JSON type. A number sent as a string is rejected, never coerced.
//! - **Pure**: no store access and no side effects. A rejected message
//!   never reaches identity resolution.
//!
//! | Kind | Required fields |
//! |------|-----------------|
//! | Card | `card_reader: integer`, `card_id: string` |
//! | Fingerprint | `fingerprint_reader: integer`, `fingerprint_id: integer` |

pub mod domain;

pub use domain::entities::{EventKind, VerificationEvent};
pub use domain::errors::{FieldIssue, FieldProblem, ValidationError};
pub use domain::schema::{validate, FieldType};
