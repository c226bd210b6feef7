//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that the event router uses
//! - **Outbound (Driven)**: The identity store this subsystem reads

pub mod inbound;
pub mod outbound;
