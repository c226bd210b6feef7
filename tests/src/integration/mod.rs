//! # Integration Tests
//!
//! Reader events go in on the verification topics, unlocks come out on the
//! unlock topic, attendance lands in the store. Nothing in between is mocked.

#[cfg(test)]
pub(crate) mod harness;
#[cfg(test)]
mod properties;
#[cfg(test)]
mod scenarios;
