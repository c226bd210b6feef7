//! # Shared Bus - Publish/Subscribe Transport Boundary
//!
//! The seam between the gateway and whatever carries reader events.
//!
//! ## Message Flow
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Field reader │                    │   Gateway    │
//! │              │    publish()       │   router     │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Transport   │          │
//!                  │ (MQTT / mem) │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Transports deliver raw `TransportMessage`s; decoding and validation
//! happen downstream. `InMemoryBroker` backs tests and local runs, and the
//! runtime crate provides the MQTT implementation.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod message;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use message::{TopicFilter, TransportMessage};
pub use publisher::{InMemoryBroker, MessagePublisher, PublishError};
pub use subscriber::{MessageSubscriber, Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
        assert_eq!(InMemoryBroker::new().capacity(), DEFAULT_CHANNEL_CAPACITY);
    }
}
