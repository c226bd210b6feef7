//! # Event Handlers
//!
//! Long-running tasks that pull messages from a subscription and drive them
//! through the router.

pub mod verification;

pub use verification::{report_outcome, VerificationHandler};
