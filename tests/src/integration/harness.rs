//! A running gateway over the in-memory broker, the in-memory store and a
//! fixed clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use gateway_runtime::adapters::InMemoryStore;
use gateway_runtime::container::{GatewayConfig, GatewayContext, StoreStatus};
use gateway_runtime::GatewayRuntime;
use serde_json::{json, Value};
use sg_04_attendance::{parse_session_start, FixedTimeSource};
use shared_bus::{
    InMemoryBroker, MessagePublisher, MessageSubscriber, Subscription, TopicFilter,
    TransportMessage,
};

pub const CARD_TOPIC: &str = "verify/card";
pub const FINGERPRINT_TOPIC: &str = "verify/fingerprint";
pub const UNLOCK_TOPIC: &str = "lock/open";

pub const SESSION_KEY: &str = "-Nsess01";
pub const SESSION_START: &str = "2025-03-01T08:00:00Z";

/// Registered identity used to flush the handler queue.
pub const SENTINEL_KEY: &str = "S3NT1NEL";

const WAIT: Duration = Duration::from_secs(2);

/// Store tree with one session started at `SESSION_START` and the sentinel
/// identity enrolled. Tests add their own identities on top.
pub fn base_store() -> Value {
    json!({
        "users": {
            "students": {
                SENTINEL_KEY: {"name": "Sentinel", "student_id": "0000-000", "registered": true}
            }
        },
        "sessions": {
            "active": {"firebaseKey": SESSION_KEY},
            SESSION_KEY: {"started": SESSION_START}
        }
    })
}

pub fn card_payload(card_id: &str) -> Value {
    json!({"card_reader": 1, "card_id": card_id})
}

pub struct TestGateway {
    pub broker: Arc<InMemoryBroker>,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedTimeSource>,
    pub runtime: GatewayRuntime,
    unlocks: Subscription,
}

impl TestGateway {
    /// Start a gateway whose clock reads `elapsed` past the session start.
    pub async fn start(data: Value, elapsed: TimeDelta) -> Self {
        let broker = Arc::new(InMemoryBroker::new());
        let store = Arc::new(InMemoryStore::with_data(data));
        let started = parse_session_start(SESSION_START).unwrap();
        let clock = Arc::new(FixedTimeSource::new(started + elapsed));

        let unlocks = broker
            .subscribe(TopicFilter::topics([UNLOCK_TOPIC]))
            .await
            .unwrap();

        let runtime = GatewayRuntime::assemble(
            GatewayContext::new(GatewayConfig::default(), StoreStatus::Available),
            store.clone(),
            clock.clone(),
            Arc::clone(&broker),
        );
        runtime.start().await.unwrap();

        Self {
            broker,
            store,
            clock,
            runtime,
            unlocks,
        }
    }

    pub async fn send(&self, topic: &str, payload: &Value) {
        self.send_raw(topic, payload.to_string().as_bytes()).await;
    }

    pub async fn send_raw(&self, topic: &str, payload: &[u8]) {
        self.broker.publish(topic, payload).await.unwrap();
    }

    /// Next unlock, or `None` if none arrives in time.
    pub async fn next_unlock(&mut self) -> Option<TransportMessage> {
        tokio::time::timeout(WAIT, self.unlocks.recv())
            .await
            .ok()
            .flatten()
    }

    /// Send the sentinel card and wait for its unlock. The handler works
    /// through messages in order, so everything sent before it is done.
    /// Unlocks expected from earlier messages must be consumed first.
    pub async fn flush(&mut self) {
        self.send(CARD_TOPIC, &card_payload(SENTINEL_KEY)).await;
        let unlock = self.next_unlock().await.expect("sentinel unlock");
        assert_eq!(unlock.payload, b"OK");
    }

    /// Unlocks already delivered and not yet consumed.
    pub fn pending_unlocks(&mut self) -> usize {
        let mut count = 0;
        while let Ok(Some(_)) = self.unlocks.try_recv() {
            count += 1;
        }
        count
    }

    pub fn attendance(&self, credential_key: &str) -> Option<Value> {
        self.store.peek(&format!(
            "sessions/{SESSION_KEY}/attendance/{credential_key}"
        ))
    }

    /// Shut the gateway down. The message in flight completes first, so
    /// store counters are final afterwards.
    pub async fn stop(&self) {
        self.runtime.shutdown().await;
    }
}
