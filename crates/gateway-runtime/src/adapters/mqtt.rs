//! # MQTT Transport
//!
//! `MessagePublisher` + `MessageSubscriber` over an MQTT broker (`rumqttc`).
//!
//! ## Connection Lifecycle
//!
//! ```text
//! connect() ──► event loop task ──► first CONNACK ──► connect() returns
//!                    │
//!                    ├── Publish ───► broadcast to subscriptions
//!                    ├── CONNACK ───► re-subscribe every requested topic
//!                    ├── error ─────► WARN, back off, poll again (reconnect)
//!                    └── disconnect() ► DISCONNECT sent, loop exits
//! ```
//!
//! Publishes use QoS 0 without retain. Inbound deliveries are fanned out
//! over a `tokio::sync::broadcast` channel exactly like `InMemoryBroker`, so
//! the handler does not care which transport it runs on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS};
use shared_bus::{
    MessagePublisher, MessageSubscriber, PublishError, Subscription, SubscriptionError,
    TopicFilter, TransportMessage, DEFAULT_CHANNEL_CAPACITY,
};
use thiserror::Error;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::container::config::MqttConfig;

/// Bound on the client request queue.
const REQUEST_QUEUE_CAPACITY: usize = 64;

/// How long `connect()` waits for the first CONNACK.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between reconnect attempts.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(2);

/// How long `disconnect()` waits for the event loop to wind down.
const DISCONNECT_GRACE: Duration = Duration::from_secs(5);

/// Subscribing to everything.
const WILDCARD_TOPIC: &str = "#";

/// Errors establishing the broker connection.
#[derive(Debug, Error)]
pub enum MqttError {
    #[error("Could not connect to {broker}: {reason}")]
    Connect { broker: String, reason: String },

    #[error("No CONNACK from {broker} within {timeout:?}")]
    Timeout { broker: String, timeout: Duration },
}

struct Shared {
    client: AsyncClient,
    sender: RwLock<Option<broadcast::Sender<TransportMessage>>>,
    topics: Mutex<Vec<String>>,
    closing: AtomicBool,
}

impl Shared {
    fn requested_topics(&self) -> Vec<String> {
        self.topics.lock().clone()
    }

    /// Queue SUBSCRIBE packets without waiting on the request channel.
    fn resubscribe_all(&self) {
        for topic in self.requested_topics() {
            if let Err(e) = self.client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
                warn!(%topic, error = %e, "Failed to queue re-subscription");
            }
        }
    }

    fn deliver(&self, topic: String, payload: &[u8]) {
        let sender = self.sender.read();
        if let Some(sender) = sender.as_ref() {
            // No receivers is fine: nothing is subscribed yet.
            let _ = sender.send(TransportMessage::new(topic, payload.to_vec()));
        }
    }
}

/// MQTT-backed transport.
pub struct MqttTransport {
    broker: String,
    shared: Arc<Shared>,
    event_loop: Mutex<Option<JoinHandle<()>>>,
}

impl MqttTransport {
    /// Connect to the broker and wait for the first CONNACK.
    ///
    /// # Errors
    ///
    /// Fails if the broker refuses or cannot be reached, or does not answer
    /// within 30 seconds. Later connection losses are retried in the
    /// background instead.
    pub async fn connect(config: &MqttConfig) -> Result<Self, MqttError> {
        let broker = format!("{}:{}", config.host, config.port);

        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        options.set_clean_session(true);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_QUEUE_CAPACITY);
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared {
            client,
            sender: RwLock::new(Some(sender)),
            topics: Mutex::new(Vec::new()),
            closing: AtomicBool::new(false),
        });

        let (ready_tx, ready_rx) = oneshot::channel();
        let handle = tokio::spawn(drive(event_loop, Arc::clone(&shared), ready_tx));

        let outcome = tokio::time::timeout(CONNECT_TIMEOUT, ready_rx).await;
        let failure = match outcome {
            Ok(Ok(Ok(()))) => None,
            Ok(Ok(Err(reason))) => Some(MqttError::Connect {
                broker: broker.clone(),
                reason,
            }),
            Ok(Err(_)) => Some(MqttError::Connect {
                broker: broker.clone(),
                reason: "event loop stopped before connecting".into(),
            }),
            Err(_) => Some(MqttError::Timeout {
                broker: broker.clone(),
                timeout: CONNECT_TIMEOUT,
            }),
        };
        if let Some(err) = failure {
            handle.abort();
            return Err(err);
        }

        info!(%broker, client_id = %config.client_id, "Connected to MQTT broker");
        Ok(Self {
            broker,
            shared,
            event_loop: Mutex::new(Some(handle)),
        })
    }

    pub fn broker(&self) -> &str {
        &self.broker
    }

    /// Send DISCONNECT, stop the event loop and close every subscription.
    pub async fn disconnect(&self) {
        if self.shared.closing.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.shared.client.disconnect().await {
            warn!(error = %e, "Failed to queue MQTT DISCONNECT");
        }

        let handle = self.event_loop.lock().take();
        if let Some(mut handle) = handle {
            if tokio::time::timeout(DISCONNECT_GRACE, &mut handle).await.is_err() {
                warn!("MQTT event loop did not stop in time, aborting");
                handle.abort();
            }
        }

        self.shared.sender.write().take();
        info!(broker = %self.broker, "Disconnected from MQTT broker");
    }
}

async fn drive(
    mut event_loop: EventLoop,
    shared: Arc<Shared>,
    ready: oneshot::Sender<Result<(), String>>,
) {
    let mut ready = Some(ready);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                debug!(session_present = ack.session_present, "CONNACK received");
                match ready.take() {
                    Some(tx) => {
                        let _ = tx.send(Ok(()));
                    }
                    None => info!("Reconnected to MQTT broker"),
                }
                shared.resubscribe_all();
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                shared.deliver(publish.topic, &publish.payload);
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                warn!("Broker sent DISCONNECT");
            }
            Ok(Event::Outgoing(rumqttc::Outgoing::Disconnect)) => {
                debug!("DISCONNECT sent");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                if shared.closing.load(Ordering::SeqCst) {
                    break;
                }
                if let Some(tx) = ready.take() {
                    let _ = tx.send(Err(e.to_string()));
                    break;
                }
                log_connection_error(&e);
                tokio::time::sleep(RECONNECT_BACKOFF).await;
            }
        }
    }
    debug!("MQTT event loop stopped");
}

fn log_connection_error(error: &ConnectionError) {
    match error {
        ConnectionError::ConnectionRefused(code) => {
            error!(?code, "MQTT broker refused reconnection");
        }
        other => warn!(error = %other, "MQTT connection lost, reconnecting"),
    }
}

#[async_trait]
impl MessagePublisher for MqttTransport {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        if self.shared.closing.load(Ordering::SeqCst) {
            return Err(PublishError::Closed);
        }
        self.shared
            .client
            .publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .await
            .map_err(|e| PublishError::Rejected {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl MessageSubscriber for MqttTransport {
    async fn subscribe(&self, filter: TopicFilter) -> Result<Subscription, SubscriptionError> {
        let receiver = self
            .shared
            .sender
            .read()
            .as_ref()
            .map(broadcast::Sender::subscribe)
            .ok_or(SubscriptionError::Closed)?;

        let wanted: Vec<String> = if filter.topics.is_empty() {
            vec![WILDCARD_TOPIC.to_string()]
        } else {
            filter.topics.clone()
        };

        for topic in wanted {
            let is_new = {
                let mut topics = self.shared.topics.lock();
                if topics.contains(&topic) {
                    false
                } else {
                    topics.push(topic.clone());
                    true
                }
            };
            if !is_new {
                continue;
            }
            self.shared
                .client
                .subscribe(topic.as_str(), QoS::AtMostOnce)
                .await
                .map_err(|e| SubscriptionError::Rejected {
                    topic: topic.clone(),
                    reason: e.to_string(),
                })?;
            info!(%topic, "Subscribed");
        }

        Ok(Subscription::new(receiver, filter))
    }
}
