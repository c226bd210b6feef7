//! # Message Publisher
//!
//! Defines the publishing side of the transport, and the in-memory broker.

use crate::message::{TopicFilter, TransportMessage};
use crate::subscriber::{MessageSubscriber, Subscription, SubscriptionError};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Errors from publish operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The transport was closed before the message could be handed over.
    #[error("Transport closed")]
    Closed,

    /// The transport client rejected the publish request.
    #[error("Publish to {topic} failed: {reason}")]
    Rejected { topic: String, reason: String },
}

/// Trait for publishing messages to the transport.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish `payload` to `topic`.
    ///
    /// `Ok` means the transport accepted the message for delivery; it says
    /// nothing about whether anyone is listening.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}

/// In-memory implementation of the transport.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Suitable for tests and single-process runs; the gateway binary talks to a
/// real broker through the MQTT adapter instead.
pub struct InMemoryBroker {
    /// Broadcast sender; `None` once the broker is closed.
    sender: RwLock<Option<broadcast::Sender<TransportMessage>>>,

    /// Total messages accepted for delivery.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryBroker {
    /// Create a new in-memory broker with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory broker with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: RwLock::new(Some(sender)),
            messages_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Close the broker. Pending subscriptions drain and then end; further
    /// publishes fail with `PublishError::Closed`.
    pub fn close(&self) {
        if self.sender.write().take().is_some() {
            debug!("In-memory broker closed");
        }
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Get the total number of messages accepted for delivery.
    #[must_use]
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryBroker {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let guard = self.sender.read();
        let Some(sender) = guard.as_ref() else {
            warn!(topic = %topic, "Publish on closed broker");
            return Err(PublishError::Closed);
        };

        self.messages_published.fetch_add(1, Ordering::Relaxed);

        match sender.send(TransportMessage::new(topic, payload)) {
            Ok(receivers) => {
                debug!(topic = %topic, receivers, "Message published");
            }
            Err(_) => {
                // Like a broker with no matching subscription: accepted, not delivered.
                debug!(topic = %topic, "Message published with no subscribers");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSubscriber for InMemoryBroker {
    async fn subscribe(&self, filter: TopicFilter) -> Result<Subscription, SubscriptionError> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or(SubscriptionError::Closed)?;
        debug!(topics = ?filter.topics, "New subscription created");
        Ok(Subscription::new(sender.subscribe(), filter))
    }
}
