//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors surfaced by the hierarchical key-value store adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (connect failure, timeout, offline).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with an error status.
    #[error("Store backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// The store answered with a body that is not valid JSON.
    #[error("Store returned undecodable data: {0}")]
    Decode(String),
}

/// A key that cannot be used as a single store path segment.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Key is empty")]
    Empty,

    #[error("Key {key:?} contains reserved character {character:?}")]
    ReservedCharacter { key: String, character: char },
}
