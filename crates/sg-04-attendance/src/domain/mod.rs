//! # Domain Layer
//!
//! Time arithmetic and session decoding, no I/O.

pub mod elapsed;
pub mod entities;
pub mod errors;
pub mod session;
