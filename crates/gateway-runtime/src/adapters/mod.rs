//! # Adapter Implementations
//!
//! Concrete implementations of the subsystem outbound ports and of the
//! transport boundary.
//!
//! ## Hexagonal Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     OUTER LAYER (Adapters)                          │
//! │  MqttTransport, RealtimeDbStore, StoreIdentityAdapter, ...          │
//! │                              ↑ implements ↑                         │
//! │                    MIDDLE LAYER (Ports)                             │
//! │  IdentityStore, SessionStore, MessagePublisher, MessageSubscriber   │
//! │                              ↑ uses ↑                               │
//! │                    INNER LAYER (Domain)                             │
//! │  Validation, resolution, policy, attendance arithmetic              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod identity_store;
pub mod mqtt;
pub mod session_store;
pub mod storage;

pub use identity_store::StoreIdentityAdapter;
pub use mqtt::{MqttError, MqttTransport};
pub use session_store::StoreSessionAdapter;
pub use storage::{DisconnectedStore, InMemoryStore, KeyValueStore, RealtimeDbStore};

use async_trait::async_trait;
use shared_bus::{InMemoryBroker, MessagePublisher, MessageSubscriber};

/// A transport the runtime can publish to, subscribe on, and shut down.
#[async_trait]
pub trait GatewayTransport: MessagePublisher + MessageSubscriber {
    /// Close the transport. Open subscriptions end.
    async fn disconnect(&self);
}

#[async_trait]
impl GatewayTransport for MqttTransport {
    async fn disconnect(&self) {
        MqttTransport::disconnect(self).await;
    }
}

#[async_trait]
impl GatewayTransport for InMemoryBroker {
    async fn disconnect(&self) {
        self.close();
    }
}
