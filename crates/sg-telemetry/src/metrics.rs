//! Prometheus metrics for the SmartGuard gateway.
//!
//! All metrics follow the naming convention: `sg_gateway_<metric>_<unit>`
//!
//! Every label takes values from a small closed set (message kinds, outcome
//! labels of the pipeline errors, attendance results).

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Inbound verification messages, by `kind` (card, fingerprint, other)
    pub static ref MESSAGES_RECEIVED: CounterVec = CounterVec::new(
        Opts::new(
            "sg_gateway_messages_received_total",
            "Verification messages received from readers"
        ),
        &["kind"]
    ).expect("metric creation failed");

    /// Final outcome of each processed message
    pub static ref ACCESS_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new(
            "sg_gateway_access_outcomes_total",
            "Verification messages by final access outcome"
        ),
        &["outcome"]
    ).expect("metric creation failed");

    /// Unlock acknowledgments published to the lock controller
    pub static ref UNLOCKS_PUBLISHED: Counter = Counter::new(
        "sg_gateway_unlocks_published_total",
        "Unlock acknowledgments published"
    ).expect("metric creation failed");

    /// Attendance recording attempts, by `result`
    pub static ref ATTENDANCE_RECORDS: CounterVec = CounterVec::new(
        Opts::new(
            "sg_gateway_attendance_total",
            "Attendance recording attempts after a granted unlock"
        ),
        &["result"]
    ).expect("metric creation failed");
}

/// Handle proving the gateway metrics are registered.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all gateway metrics in [`REGISTRY`].
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MESSAGES_RECEIVED.clone()),
        Box::new(ACCESS_OUTCOMES.clone()),
        Box::new(UNLOCKS_PUBLISHED.clone()),
        Box::new(ATTENDANCE_RECORDS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: REGISTRY.clone(),
    })
}

/// Render the registry in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_is_idempotent() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_counters_appear_in_exposition() {
        register_metrics().unwrap();
        MESSAGES_RECEIVED.with_label_values(&["card"]).inc();
        ACCESS_OUTCOMES.with_label_values(&["granted"]).inc();
        UNLOCKS_PUBLISHED.inc();
        ATTENDANCE_RECORDS.with_label_values(&["recorded"]).inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("sg_gateway_messages_received_total{kind=\"card\"}"));
        assert!(text.contains("sg_gateway_access_outcomes_total{outcome=\"granted\"}"));
        assert!(text.contains("sg_gateway_unlocks_published_total"));
        assert!(text.contains("sg_gateway_attendance_total{result=\"recorded\"}"));
    }
}
