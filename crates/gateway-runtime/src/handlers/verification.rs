use std::sync::Arc;

use sg_02_identity_resolution::ResolutionError;
use sg_telemetry::{
    metric_inc, ACCESS_OUTCOMES, ATTENDANCE_RECORDS, MESSAGES_RECEIVED, UNLOCKS_PUBLISHED,
};
use shared_bus::{Subscription, TransportMessage};
use tokio::sync::watch;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::wiring::{AccessGranted, EventRouter, PipelineError};

/// Handler for reader verification messages.
///
/// Processes one message at a time. A message that has been taken from the
/// subscription always runs to completion, shutdown included.
pub struct VerificationHandler {
    router: Arc<EventRouter>,
    subscription: Subscription,
}

impl VerificationHandler {
    pub fn new(router: Arc<EventRouter>, subscription: Subscription) -> Self {
        Self {
            router,
            subscription,
        }
    }

    /// Run the handler loop until shutdown is signalled or the transport closes.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(topics = ?self.subscription.filter().topics, "Verification handler started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            let message = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                    continue;
                }
                message = self.subscription.recv() => match message {
                    Some(message) => message,
                    None => {
                        warn!("Transport closed, verification handler stopping");
                        break;
                    }
                },
            };

            let span = info_span!(
                "verification",
                event_id = %Uuid::new_v4(),
                topic = %message.topic
            );
            self.handle(message).instrument(span).await;
        }

        info!("Verification handler stopped");
    }

    async fn handle(&self, message: TransportMessage) {
        let route = self.router.routes().classify(&message.topic);
        metric_inc!(MESSAGES_RECEIVED, &[route.kind_label()]);

        let outcome = self.router.route(&message).await;
        if let Err(PipelineError::Parse(_)) = &outcome {
            warn!(payload = %message.payload_lossy(), "Unparseable payload");
        }
        report_outcome(&outcome);
    }
}

/// Log and count the outcome of one pipeline pass.
pub fn report_outcome(outcome: &Result<AccessGranted, PipelineError>) {
    match outcome {
        Ok(granted) => {
            metric_inc!(ACCESS_OUTCOMES, &["granted"]);
            metric_inc!(UNLOCKS_PUBLISHED);
            info!(
                credential = %granted.identity.credential_key,
                method = %granted.method,
                "Access granted, door unlocked"
            );
            report_attendance(granted);
        }
        Err(e) => {
            metric_inc!(ACCESS_OUTCOMES, &[e.outcome_label()]);
            report_failure(e);
        }
    }
}

fn report_attendance(granted: &AccessGranted) {
    match &granted.attendance {
        Ok(receipt) => {
            metric_inc!(ATTENDANCE_RECORDS, &["recorded"]);
            info!(
                session = %receipt.session_key,
                credential = %receipt.credential_key,
                elapsed_ms = receipt.elapsed_ms,
                "Attendance recorded"
            );
        }
        Err(e) => {
            metric_inc!(ATTENDANCE_RECORDS, &[e.outcome_label()]);
            if e.is_fault() {
                error!(error = %e, "Attendance not recorded");
            } else {
                warn!(error = %e, "Attendance not recorded");
            }
        }
    }
}

fn report_failure(error: &PipelineError) {
    let outcome = error.outcome_label();
    match error {
        PipelineError::Parse(_)
        | PipelineError::UnknownTopic(_)
        | PipelineError::OutboundOnlyTopic(_) => {
            warn!(outcome, %error, "Message rejected");
        }
        PipelineError::Validation(e) => {
            warn!(outcome, fields = ?e.offending_fields(), error = %e, "Invalid verification event");
        }
        PipelineError::Resolution(e) => match e {
            ResolutionError::NotFound(lookup) => {
                info!(outcome, %lookup, "Access denied: identity not found");
            }
            ResolutionError::InvalidKey(_) => {
                warn!(outcome, error = %e, "Access denied: unusable credential");
            }
            ResolutionError::StoreUnavailable(_) | ResolutionError::CorruptRecord { .. } => {
                error!(outcome, error = %e, "Access denied: identity could not be resolved");
            }
        },
        PipelineError::Denied { credential_key, reason } => {
            info!(outcome, credential = %credential_key, %reason, "Access denied");
        }
        PipelineError::Publish(e) => {
            error!(outcome, error = %e, "Access granted but unlock could not be published");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::container::{GatewayConfig, GatewayContext, StoreStatus};
    use chrono::Utc;
    use serde_json::json;
    use sg_04_attendance::FixedTimeSource;
    use shared_bus::{InMemoryBroker, MessagePublisher, MessageSubscriber, TopicFilter};
    use std::time::Duration;

    fn router(broker: Arc<InMemoryBroker>, store: Arc<InMemoryStore>) -> Arc<EventRouter> {
        let context = Arc::new(GatewayContext::new(
            GatewayConfig::default(),
            StoreStatus::Available,
        ));
        Arc::new(EventRouter::over_store(
            context,
            store,
            Arc::new(FixedTimeSource::new(Utc::now())),
            broker,
        ))
    }

    #[tokio::test]
    async fn test_handler_processes_and_stops_on_shutdown() {
        let broker = Arc::new(InMemoryBroker::new());
        let store = Arc::new(InMemoryStore::with_data(json!({
            "users": {"students": {"A1B2C3": {"name": "Jane Doe", "registered": true}}}
        })));
        let router = router(Arc::clone(&broker), Arc::clone(&store));

        let inbound = broker
            .subscribe(TopicFilter::topics(router.routes().inbound()))
            .await
            .unwrap();
        let mut unlocks = broker
            .subscribe(TopicFilter::topics(["lock/open"]))
            .await
            .unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(VerificationHandler::new(router, inbound).run(shutdown_rx));

        broker
            .publish("verify/card", br#"{"card_reader":1,"card_id":"A1B2C3"}"#)
            .await
            .unwrap();

        let unlock = tokio::time::timeout(Duration::from_secs(2), unlocks.recv())
            .await
            .expect("unlock within timeout")
            .expect("unlock message");
        assert_eq!(unlock.payload, b"OK");

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("handler stops")
            .unwrap();
    }

    #[tokio::test]
    async fn test_handler_stops_when_transport_closes() {
        let broker = Arc::new(InMemoryBroker::new());
        let router = router(Arc::clone(&broker), Arc::new(InMemoryStore::new()));
        let inbound = broker.subscribe(TopicFilter::all()).await.unwrap();

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(VerificationHandler::new(router, inbound).run(shutdown_rx));

        broker.close();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("handler stops")
            .unwrap();
    }
}
