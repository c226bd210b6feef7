//! # Ports Layer
//!
//! - **Inbound (Driving)**: `AttendanceApi`, called by the event router
//! - **Outbound (Driven)**: `SessionStore` and `TimeSource`

pub mod inbound;
pub mod outbound;
