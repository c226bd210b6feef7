//! # Message Subscriber
//!
//! Defines the subscription side of the transport.

use crate::message::{TopicFilter, TransportMessage};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The transport was closed.
    #[error("Transport closed")]
    Closed,

    /// The transport refused or failed the subscribe request.
    #[error("Subscribe to {topic} failed: {reason}")]
    Rejected { topic: String, reason: String },
}

/// Trait for subscribing to messages from the transport.
#[async_trait]
pub trait MessageSubscriber: Send + Sync {
    /// Subscribe to messages matching a filter.
    ///
    /// Messages published after this call returns are delivered to the
    /// returned handle.
    async fn subscribe(&self, filter: TopicFilter) -> Result<Subscription, SubscriptionError>;
}

/// A subscription handle for receiving messages.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<TransportMessage>,

    /// Filter for this subscription.
    filter: TopicFilter,
}

impl Subscription {
    /// Wrap a broadcast receiver fed by a transport.
    #[must_use]
    pub fn new(receiver: broadcast::Receiver<TransportMessage>, filter: TopicFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next message that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next matching message
    /// - `None` - The transport was closed
    pub async fn recv(&mut self) -> Option<TransportMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(dropped = count, "Subscriber lagged, messages dropped");
                    continue;
                }
            };

            if self.filter.matches(&message) {
                return Some(message);
            }
            debug!(topic = %message.topic, "Message outside subscription filter skipped");
        }
    }

    /// Try to receive the next message without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was available and matched
    /// - `Ok(None)` - No message available (would block)
    /// - `Err(SubscriptionError::Closed)` - The transport was closed
    pub fn try_recv(&mut self) -> Result<Option<TransportMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(dropped = count, "Subscriber lagged, messages dropped");
                    continue;
                }
            };

            if self.filter.matches(&message) {
                return Ok(Some(message));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &TopicFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::{InMemoryBroker, MessagePublisher};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_subscription_recv() {
        let broker = InMemoryBroker::new();
        let mut sub = broker.subscribe(TopicFilter::all()).await.unwrap();

        broker.publish("verify/card", b"{}").await.unwrap();

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("message");
        assert_eq!(received.topic, "verify/card");
        assert_eq!(received.payload, b"{}");
    }

    #[tokio::test]
    async fn test_subscription_filters_topics() {
        let broker = InMemoryBroker::new();
        let mut sub = broker
            .subscribe(TopicFilter::topics(["verify/card"]))
            .await
            .unwrap();

        broker.publish("lock/open", b"OK").await.unwrap();
        broker.publish("verify/card", b"{}").await.unwrap();

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("message");
        assert_eq!(received.topic, "verify/card");
        assert_eq!(sub.try_recv(), Ok(None));
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let broker = InMemoryBroker::new();
        let mut sub = broker.subscribe(TopicFilter::all()).await.unwrap();
        assert_eq!(sub.try_recv(), Ok(None));
    }

    #[tokio::test]
    async fn test_recv_returns_none_after_close() {
        let broker = InMemoryBroker::new();
        let mut sub = broker.subscribe(TopicFilter::all()).await.unwrap();

        broker.close();

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout");
        assert!(received.is_none());
    }
}
