//! # Gateway Configuration
//!
//! Unified configuration for the transport, topics and store.
//!
//! Defaults are overridden from `SG_*` environment variables. Unparseable
//! values are reported and the default is kept, so a typo never prevents
//! startup; `validate()` then rejects combinations the router cannot serve.

use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    /// MQTT broker connection.
    pub mqtt: MqttConfig,
    /// Topic names, prefix already applied.
    pub topics: TopicConfig,
    /// Identity and session store.
    pub store: StoreConfig,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // MQTT
        if let Some(host) = var("SG_MQTT_HOST") {
            config.mqtt.host = host;
        }
        if let Some(port) = parse_var(&var, "SG_MQTT_PORT") {
            config.mqtt.port = port;
        }
        if let Some(client_id) = var("SG_MQTT_CLIENT_ID") {
            config.mqtt.client_id = client_id;
        }
        if let Some(keep_alive) = parse_var(&var, "SG_MQTT_KEEP_ALIVE_SECS") {
            config.mqtt.keep_alive_secs = keep_alive;
        }
        config.mqtt.username = var("SG_MQTT_USERNAME");
        config.mqtt.password = var("SG_MQTT_PASSWORD");

        // Topics
        if let Some(card) = var("SG_TOPIC_CARD") {
            config.topics.card = card;
        }
        if let Some(fingerprint) = var("SG_TOPIC_FINGERPRINT") {
            config.topics.fingerprint = fingerprint;
        }
        if let Some(unlock) = var("SG_TOPIC_UNLOCK") {
            config.topics.unlock = unlock;
        }
        if let Some(prefix) = var("SG_TOPIC_PREFIX") {
            config.topics = config.topics.with_prefix(&prefix);
        }

        // Store
        if let Some(mode) = var("SG_STORE_MODE") {
            match StoreMode::parse(&mode) {
                Some(parsed) => config.store.mode = parsed,
                None => warn!(
                    variable = "SG_STORE_MODE",
                    value = %mode,
                    "Unknown store mode, keeping default"
                ),
            }
        }
        config.store.url = var("SG_STORE_URL");
        config.store.auth_token = var("SG_STORE_AUTH_TOKEN");

        config
    }

    /// Reject configurations the gateway cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.mqtt.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        for (name, topic) in [
            ("card", &self.topics.card),
            ("fingerprint", &self.topics.fingerprint),
            ("unlock", &self.topics.unlock),
        ] {
            if topic.trim().is_empty() {
                return Err(ConfigError::EmptyTopic { name });
            }
        }

        if self.topics.card == self.topics.fingerprint {
            return Err(ConfigError::DuplicateInboundTopic {
                topic: self.topics.card.clone(),
            });
        }
        if self.topics.unlock == self.topics.card || self.topics.unlock == self.topics.fingerprint
        {
            return Err(ConfigError::UnlockTopicIsInbound {
                topic: self.topics.unlock.clone(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Option<T> {
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "Unparseable value, keeping default");
            None
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("MQTT host is empty (set SG_MQTT_HOST)")]
    EmptyHost,

    #[error("MQTT port must be non-zero (set SG_MQTT_PORT)")]
    InvalidPort,

    #[error("The {name} topic is empty")]
    EmptyTopic { name: &'static str },

    #[error("Card and fingerprint events share topic {topic:?}")]
    DuplicateInboundTopic { topic: String },

    #[error("Unlock topic {topic:?} is also an inbound topic")]
    UnlockTopicIsInbound { topic: String },
}

/// MQTT broker configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct MqttConfig {
    /// Broker host name.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Client identifier; must be unique per connection on the broker.
    pub client_id: String,
    /// Keep-alive interval in seconds (0 disables keep-alive).
    pub keep_alive_secs: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "broker.emqx.io".to_string(),
            port: 1883,
            client_id: format!("smartguard-gateway-{}", Uuid::new_v4().simple()),
            keep_alive_secs: 60,
            username: None,
            password: None,
        }
    }
}

impl std::fmt::Debug for MqttConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("client_id", &self.client_id)
            .field("keep_alive_secs", &self.keep_alive_secs)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Topic names used by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    /// Inbound badge verifications.
    pub card: String,
    /// Inbound fingerprint verifications.
    pub fingerprint: String,
    /// Outbound unlock directive. Never subscribed.
    pub unlock: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            card: "verify/card".to_string(),
            fingerprint: "verify/fingerprint".to_string(),
            unlock: "lock/open".to_string(),
        }
    }
}

impl TopicConfig {
    /// Prepend `prefix/` to every topic.
    #[must_use]
    pub fn with_prefix(self, prefix: &str) -> Self {
        let prefix = prefix.trim().trim_end_matches('/');
        if prefix.is_empty() {
            return self;
        }
        let join = |topic: String| format!("{}/{}", prefix, topic.trim_start_matches('/'));
        Self {
            card: join(self.card),
            fingerprint: join(self.fingerprint),
            unlock: join(self.unlock),
        }
    }
}

/// Which store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreMode {
    /// Realtime database over its REST interface.
    #[default]
    RealtimeDb,
    /// Process-local JSON tree; starts empty.
    Memory,
}

impl StoreMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "realtime-db" | "realtime_db" | "firebase" => Some(StoreMode::RealtimeDb),
            "memory" | "in-memory" => Some(StoreMode::Memory),
            _ => None,
        }
    }
}

/// Store configuration.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct StoreConfig {
    pub mode: StoreMode,
    /// Database base URL. Unset in `RealtimeDb` mode means no store.
    pub url: Option<String>,
    /// Optional `auth` query token.
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("mode", &self.mode)
            .field("url", &self.url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
