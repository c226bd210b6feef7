//! # Domain Layer
//!
//! Pure resolution logic with no I/O dependencies.

pub mod entities;
pub mod errors;
pub mod scan;
