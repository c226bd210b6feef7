//! # Event Routing
//!
//! Drives one inbound transport message through the verification pipeline.
//!
//! ## Pipeline (per message)
//!
//! ```text
//! Received ──► Parsed ──► topic matched ──► Validated ──► Resolved
//!    │            │             │               │             │
//!    │       [Parse]   [UnknownTopic /    [Validation]   [Resolution]
//!    │                 OutboundOnlyTopic]                     │
//!    │                                                        ▼
//!    │                                               PolicyChecked ──[Denied]
//!    │                                                        │
//!    │                                                        ▼
//!    │                                     publish unlock ──[Publish]
//!    │                                                        │
//!    │                                                        ▼
//!    └──────────────────────────────────────────► record attendance
//! ```
//!
//! Every bracketed state is terminal for that message only. Attendance
//! failures do not fail the pipeline: the unlock has already been published
//! and is never revoked, so they are carried inside [`AccessGranted`].

use std::sync::Arc;

use serde_json::Value;
use sg_01_message_validation::{validate, EventKind, ValidationError, VerificationEvent};
use sg_02_identity_resolution::{
    IdentityResolutionApi, IdentityResolver, ResolutionError, ResolvedIdentity,
};
use sg_03_access_policy::{AccessDecision, AccessPolicy, DenialReason, RegistrationPolicy};
use sg_04_attendance::{
    AttendanceApi, AttendanceError, AttendanceReceipt, AttendanceRecorder, TimeSource,
};
use shared_bus::{MessagePublisher, PublishError, TransportMessage};
use shared_types::{CredentialKey, IdentityRecord, StoreError, VerificationMethod};
use thiserror::Error;
use tracing::{debug, info};

use crate::adapters::{KeyValueStore, StoreIdentityAdapter, StoreSessionAdapter};
use crate::container::{GatewayContext, TopicConfig};

/// What a topic means to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Card,
    Fingerprint,
    /// The unlock topic; publish-only.
    Unlock,
    Unknown,
}

impl Route {
    /// Label for the `kind` dimension of the received-messages counter.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Route::Card => EventKind::Card.as_str(),
            Route::Fingerprint => EventKind::Fingerprint.as_str(),
            Route::Unlock | Route::Unknown => "other",
        }
    }
}

/// Topic table derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRoutes {
    card: String,
    fingerprint: String,
    unlock: String,
}

impl TopicRoutes {
    pub fn new(topics: &TopicConfig) -> Self {
        Self {
            card: topics.card.clone(),
            fingerprint: topics.fingerprint.clone(),
            unlock: topics.unlock.clone(),
        }
    }

    pub fn classify(&self, topic: &str) -> Route {
        if topic == self.card {
            Route::Card
        } else if topic == self.fingerprint {
            Route::Fingerprint
        } else if topic == self.unlock {
            Route::Unlock
        } else {
            Route::Unknown
        }
    }

    /// Topics the gateway subscribes to. The unlock topic is never one.
    pub fn inbound(&self) -> Vec<String> {
        vec![self.card.clone(), self.fingerprint.clone()]
    }

    pub fn unlock(&self) -> &str {
        &self.unlock
    }
}

/// Terminal failure of one message's pipeline pass.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Payload is not valid JSON: {0}")]
    Parse(String),

    #[error("Unknown topic {0:?}")]
    UnknownTopic(String),

    #[error("Topic {0:?} is outbound-only and is never consumed")]
    OutboundOnlyTopic(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Access denied for {credential_key}: {reason}")]
    Denied {
        credential_key: CredentialKey,
        reason: DenialReason,
    },

    #[error("Unlock publish failed: {0}")]
    Publish(#[from] PublishError),
}

impl PipelineError {
    /// Label for the `outcome` dimension of the access-outcomes counter.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            PipelineError::Parse(_) => "parse_failure",
            PipelineError::UnknownTopic(_) => "unknown_topic",
            PipelineError::OutboundOnlyTopic(_) => "outbound_only_topic",
            PipelineError::Validation(_) => "validation_failure",
            PipelineError::Resolution(e) => e.outcome_label(),
            PipelineError::Denied { .. } => "denied",
            PipelineError::Publish(_) => "publish_failure",
        }
    }
}

/// Access granted and the unlock published.
#[derive(Debug)]
pub struct AccessGranted {
    pub method: VerificationMethod,
    pub identity: ResolvedIdentity,
    /// Outcome of the attendance write that followed the unlock.
    pub attendance: Result<AttendanceReceipt, AttendanceError>,
}

/// The verification pipeline.
pub struct EventRouter {
    context: Arc<GatewayContext>,
    routes: TopicRoutes,
    resolver: Arc<dyn IdentityResolutionApi>,
    policy: Arc<dyn AccessPolicy>,
    attendance: Arc<dyn AttendanceApi>,
    publisher: Arc<dyn MessagePublisher>,
}

impl EventRouter {
    pub fn new(
        context: Arc<GatewayContext>,
        resolver: Arc<dyn IdentityResolutionApi>,
        policy: Arc<dyn AccessPolicy>,
        attendance: Arc<dyn AttendanceApi>,
        publisher: Arc<dyn MessagePublisher>,
    ) -> Self {
        let routes = TopicRoutes::new(&context.config.topics);
        Self {
            context,
            routes,
            resolver,
            policy,
            attendance,
            publisher,
        }
    }

    /// Wire the standard subsystems over one key-value store.
    pub fn over_store(
        context: Arc<GatewayContext>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn TimeSource>,
        publisher: Arc<dyn MessagePublisher>,
    ) -> Self {
        let resolver = IdentityResolver::new(StoreIdentityAdapter::new(Arc::clone(&store)));
        let recorder = AttendanceRecorder::with_clock(StoreSessionAdapter::new(store), clock);
        Self::new(
            context,
            Arc::new(resolver),
            Arc::new(RegistrationPolicy),
            Arc::new(recorder),
            publisher,
        )
    }

    pub fn routes(&self) -> &TopicRoutes {
        &self.routes
    }

    pub fn context(&self) -> &GatewayContext {
        &self.context
    }

    /// Run one message through the pipeline.
    pub async fn route(&self, message: &TransportMessage) -> Result<AccessGranted, PipelineError> {
        let payload: Value = serde_json::from_slice(&message.payload)
            .map_err(|e| PipelineError::Parse(e.to_string()))?;

        let kind = match self.routes.classify(&message.topic) {
            Route::Card => EventKind::Card,
            Route::Fingerprint => EventKind::Fingerprint,
            Route::Unlock => return Err(PipelineError::OutboundOnlyTopic(message.topic.clone())),
            Route::Unknown => return Err(PipelineError::UnknownTopic(message.topic.clone())),
        };

        let event = validate(kind, &payload)?;
        debug!(reader_id = event.reader_id(), kind = kind.as_str(), "Event validated");

        let (identity, method) = self.resolve(event).await?;

        match self.policy.decide(&identity.record) {
            AccessDecision::Deny(reason) => Err(PipelineError::Denied {
                credential_key: identity.credential_key,
                reason,
            }),
            AccessDecision::Allow(directive) => {
                self.publisher
                    .publish(self.routes.unlock(), directive.payload())
                    .await?;
                info!(topic = %self.routes.unlock(), "Unlock published");

                let attendance = self
                    .attendance
                    .record(&identity.credential_key, &identity.record, method)
                    .await;
                Ok(AccessGranted {
                    method,
                    identity,
                    attendance,
                })
            }
        }
    }

    async fn resolve(
        &self,
        event: VerificationEvent,
    ) -> Result<(ResolvedIdentity, VerificationMethod), PipelineError> {
        if !self.context.store_available() {
            return Err(ResolutionError::StoreUnavailable(StoreError::Unavailable(
                "gateway started without a reachable store".into(),
            ))
            .into());
        }

        let (resolved, method) = match event {
            VerificationEvent::Card { credential_id, .. } => (
                self.resolver.resolve_by_credential(&credential_id).await,
                VerificationMethod::Rfid,
            ),
            VerificationEvent::Fingerprint { template_id, .. } => (
                self.resolver.resolve_by_fingerprint(template_id).await,
                VerificationMethod::Fingerprint,
            ),
        };
        let identity = resolved?;
        report_identity(&identity, method);
        Ok((identity, method))
    }
}

fn report_identity(identity: &ResolvedIdentity, method: VerificationMethod) {
    let record: &IdentityRecord = &identity.record;
    info!(
        credential = %identity.credential_key,
        method = %method,
        name = IdentityRecord::display(&record.name),
        student_id = IdentityRecord::display(&record.student_id),
        course = IdentityRecord::display(&record.course),
        year_level = IdentityRecord::display(&record.year_level),
        email = IdentityRecord::display(&record.email),
        registered = record.registered,
        "Identity resolved"
    );
    if method == VerificationMethod::Fingerprint {
        info!(
            credential = %identity.credential_key,
            templates = ?record.claimed_templates(),
            "Fingerprint templates on record"
        );
    }
}
