//! # SmartGuard Gateway Runtime
//!
//! Composition root for the gateway: turns configuration into a running
//! verification pipeline.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration, lifecycle state, store construction
//! - `adapters/` - MQTT transport, store backends, subsystem port adapters
//! - `wiring/` - the event router joining SG-01 through SG-04
//! - `handlers/` - the subscription loop and outcome reporting
//!
//! ## Startup Sequence
//!
//! 1. Load and validate configuration
//! 2. Build the store and probe it (unreachable ⇒ degraded, not fatal)
//! 3. Connect the transport (failure is fatal)
//! 4. Subscribe to the inbound topics and spawn the verification handler
//!
//! ## Shutdown Sequence
//!
//! 1. Signal the handler; the message in flight completes
//! 2. Wait for the handler task to exit
//! 3. Disconnect the transport
//! 4. Log a final metrics snapshot

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod wiring;

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use sg_04_attendance::{SystemTimeSource, TimeSource};
use shared_bus::TopicFilter;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::adapters::{DisconnectedStore, GatewayTransport, KeyValueStore, MqttTransport};
use crate::container::{build_store, probe_store, GatewayConfig, GatewayContext};
use crate::handlers::VerificationHandler;
use crate::wiring::EventRouter;

/// The running gateway.
pub struct GatewayRuntime {
    context: Arc<GatewayContext>,
    router: Arc<EventRouter>,
    transport: Arc<dyn GatewayTransport>,
    shutdown_tx: watch::Sender<bool>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl GatewayRuntime {
    /// Bootstrap against the configured MQTT broker and store.
    pub async fn bootstrap(config: GatewayConfig) -> Result<Self> {
        config
            .validate()
            .context("Invalid gateway configuration")?;

        let store: Arc<dyn KeyValueStore> = match build_store(&config.store) {
            Ok(store) => store,
            Err(e) => {
                error!(error = %e, "Store could not be configured");
                Arc::new(DisconnectedStore)
            }
        };
        let store_status = probe_store(store.as_ref()).await;

        let transport = MqttTransport::connect(&config.mqtt)
            .await
            .context("Failed to connect to MQTT broker")?;

        let context = GatewayContext::new(config, store_status);
        Ok(Self::assemble(
            context,
            store,
            Arc::new(SystemTimeSource),
            Arc::new(transport),
        ))
    }

    /// Assemble a runtime from already-built parts.
    pub fn assemble<T: GatewayTransport + 'static>(
        context: GatewayContext,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn TimeSource>,
        transport: Arc<T>,
    ) -> Self {
        let context = Arc::new(context);
        let router = Arc::new(EventRouter::over_store(
            Arc::clone(&context),
            store,
            clock,
            transport.clone(),
        ));
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            context,
            router,
            transport,
            shutdown_tx,
            handler: Mutex::new(None),
        }
    }

    /// Subscribe to the inbound topics and start the verification handler.
    pub async fn start(&self) -> Result<()> {
        let topics = self.router.routes().inbound();
        let subscription = self
            .transport
            .subscribe(TopicFilter::topics(topics.clone()))
            .await
            .context("Failed to subscribe to verification topics")?;

        let handler = VerificationHandler::new(Arc::clone(&self.router), subscription);
        let task = tokio::spawn(handler.run(self.shutdown_tx.subscribe()));
        if let Some(previous) = self.handler.lock().replace(task) {
            previous.abort();
        }

        info!(
            ?topics,
            unlock = %self.router.routes().unlock(),
            store_available = self.context.store_available(),
            "SmartGuard gateway running"
        );
        Ok(())
    }

    /// Stop the handler, disconnect the transport and log final metrics.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if self.shutdown_tx.send(true).is_err() {
            // No receiver: the handler already stopped or never started.
            info!("Verification handler not running");
        }

        let handler = self.handler.lock().take();
        if let Some(handler) = handler {
            if let Err(e) = handler.await {
                error!(error = %e, "Verification handler ended abnormally");
            }
        }

        self.transport.disconnect().await;

        match sg_telemetry::encode_metrics() {
            Ok(snapshot) => info!("Final metrics snapshot:\n{snapshot}"),
            Err(e) => error!(error = %e, "Failed to encode metrics"),
        }
        info!("Shutdown complete");
    }

    pub fn context(&self) -> &GatewayContext {
        &self.context
    }

    pub fn router(&self) -> Arc<EventRouter> {
        Arc::clone(&self.router)
    }
}
