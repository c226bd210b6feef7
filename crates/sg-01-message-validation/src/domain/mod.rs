//! # Domain Layer
//!
//! Event types, the per-kind schemas and the validation errors.

pub mod entities;
pub mod errors;
pub mod schema;
