//! # Transport Messages
//!
//! The unit every transport delivers, and the topic filter subscriptions use.

use serde::{Deserialize, Serialize};

/// A raw message as delivered by the publish/subscribe transport.
///
/// The payload is left undecoded; parsing belongs to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMessage {
    /// Topic the message was published to.
    pub topic: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

impl TransportMessage {
    /// Create a message for `topic` carrying `payload`.
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Payload as text, lossily, for log lines.
    #[must_use]
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Filter for subscribing to specific topics.
///
/// Topics match exactly. An empty filter matches every topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<String>,
}

impl TopicFilter {
    /// Create a filter that accepts all messages.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    pub fn topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a message matches this filter.
    #[must_use]
    pub fn matches(&self, message: &TransportMessage) -> bool {
        self.topics.is_empty() || self.topics.iter().any(|t| *t == message.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_all() {
        let filter = TopicFilter::all();
        assert!(filter.matches(&TransportMessage::new("anything", "x")));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = TopicFilter::topics(["verify/card", "verify/fingerprint"]);

        assert!(filter.matches(&TransportMessage::new("verify/card", "{}")));
        assert!(filter.matches(&TransportMessage::new("verify/fingerprint", "{}")));
        assert!(!filter.matches(&TransportMessage::new("lock/open", "OK")));
        // No prefix or wildcard matching
        assert!(!filter.matches(&TransportMessage::new("verify/card/extra", "{}")));
    }

    #[test]
    fn test_payload_lossy() {
        let message = TransportMessage::new("t", vec![b'O', b'K', 0xFF]);
        assert_eq!(message.payload_lossy(), "OK\u{FFFD}");
    }
}
