//! # Pipeline Properties
//!
//! Properties over the whole pipeline, driven through the router so each
//! case can count publishes, lookups and writes exactly.

use std::future::Future;
use std::sync::Arc;

use chrono::TimeDelta;
use gateway_runtime::adapters::InMemoryStore;
use gateway_runtime::container::{GatewayConfig, GatewayContext, StoreStatus};
use gateway_runtime::wiring::{EventRouter, PipelineError};
use proptest::prelude::*;
use serde_json::{json, Value};
use sg_02_identity_resolution::{IdentityResolutionApi, IdentityResolver};
use sg_04_attendance::{parse_session_start, FixedTimeSource};
use shared_bus::{InMemoryBroker, TransportMessage};

use super::harness::{base_store, card_payload, CARD_TOPIC, SESSION_KEY, SESSION_START};

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

struct Pipeline {
    broker: Arc<InMemoryBroker>,
    store: Arc<InMemoryStore>,
    clock: Arc<FixedTimeSource>,
    router: EventRouter,
}

impl Pipeline {
    fn new(data: Value, elapsed_ms: i64) -> Self {
        let broker = Arc::new(InMemoryBroker::new());
        let store = Arc::new(InMemoryStore::with_data(data));
        let started = parse_session_start(SESSION_START).unwrap();
        let clock = Arc::new(FixedTimeSource::new(
            started + TimeDelta::milliseconds(elapsed_ms),
        ));
        let context = Arc::new(GatewayContext::new(
            GatewayConfig::default(),
            StoreStatus::Available,
        ));
        let router = EventRouter::over_store(context, store.clone(), clock.clone(), broker.clone());
        Self {
            broker,
            store,
            clock,
            router,
        }
    }

    async fn card(&self, payload: &Value) -> Result<(), PipelineError> {
        self.router
            .route(&TransportMessage::new(CARD_TOPIC, payload.to_string()))
            .await
            .map(|_| ())
    }
}

fn with_identity(key: &str, registered: bool) -> Value {
    let mut data = base_store();
    data["users"]["students"][key] = json!({
        "name": "Student",
        "student_id": "2021-100",
        "registered": registered
    });
    data
}

fn credential_key() -> impl Strategy<Value = String> {
    "[A-Z0-9]{4,12}"
}

fn not_an_integer() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        "[a-z0-9]{0,8}".prop_map(Value::from),
        (-1.0e6f64..1.0e6f64)
            .prop_filter("fractional", |f| f.fract() != 0.0)
            .prop_map(Value::from),
        Just(Value::Null),
        Just(json!([1])),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_registered_card_unlocks_once_and_records_elapsed(
        key in credential_key(),
        elapsed_ms in 0i64..86_400_000,
    ) {
        let pipeline = Pipeline::new(with_identity(&key, true), elapsed_ms);

        block_on(pipeline.card(&card_payload(&key))).unwrap();

        prop_assert_eq!(pipeline.broker.messages_published(), 1);
        prop_assert_eq!(pipeline.store.writes(), 1);
        let entry = pipeline
            .store
            .peek(&format!("sessions/{SESSION_KEY}/attendance/{key}"))
            .unwrap();
        prop_assert_eq!(&entry["timeIn"], &json!(elapsed_ms.to_string()));
    }

    #[test]
    fn prop_unregistered_card_never_unlocks_or_writes(key in credential_key()) {
        let pipeline = Pipeline::new(with_identity(&key, false), 1_000);

        let outcome = block_on(pipeline.card(&card_payload(&key)));

        let is_denied = matches!(outcome, Err(PipelineError::Denied { .. }));
        prop_assert!(is_denied);
        prop_assert_eq!(pipeline.broker.messages_published(), 0);
        prop_assert_eq!(pipeline.store.writes(), 0);
    }

    #[test]
    fn prop_invalid_events_perform_no_lookup(
        key in credential_key(),
        reader in not_an_integer(),
        drop_card_id in any::<bool>(),
    ) {
        let pipeline = Pipeline::new(with_identity(&key, true), 1_000);
        let mut payload = json!({"card_reader": reader, "card_id": key});
        if drop_card_id {
            payload.as_object_mut().unwrap().remove("card_id");
        }

        let outcome = block_on(pipeline.card(&payload));

        match outcome {
            Err(PipelineError::Validation(e)) => {
                prop_assert!(e.offending_fields().contains(&"card_reader"));
                prop_assert_eq!(e.offending_fields().contains(&"card_id"), drop_card_id);
            }
            other => prop_assert!(false, "expected validation failure, got {:?}", other),
        }
        prop_assert_eq!(pipeline.store.reads(), 0);
        prop_assert_eq!(pipeline.broker.messages_published(), 0);
    }

    #[test]
    fn prop_replayed_grants_keep_one_entry(
        key in credential_key(),
        replays in 1usize..5,
        step_ms in 1i64..60_000,
    ) {
        let pipeline = Pipeline::new(with_identity(&key, true), 0);

        for _ in 0..replays {
            block_on(pipeline.card(&card_payload(&key))).unwrap();
            pipeline.clock.advance(TimeDelta::milliseconds(step_ms));
        }

        let attendance = pipeline
            .store
            .peek(&format!("sessions/{SESSION_KEY}/attendance"))
            .unwrap();
        prop_assert_eq!(attendance.as_object().unwrap().len(), 1);
        let last = (replays as i64 - 1) * step_ms;
        prop_assert_eq!(&attendance[key.as_str()]["timeIn"], &json!(last.to_string()));
    }

    #[test]
    fn prop_fingerprint_resolution_is_idempotent(
        owners in prop::collection::btree_map(credential_key(), 0i64..200, 1..20),
        probe in 0i64..200,
    ) {
        let students: serde_json::Map<String, Value> = owners
            .iter()
            .map(|(key, template)| {
                (key.clone(), json!({"registered": true, "fprints": {template.to_string(): true}}))
            })
            .collect();
        let store = Arc::new(InMemoryStore::with_data(json!({"users": {"students": students}})));
        let resolver = IdentityResolver::new(
            gateway_runtime::adapters::StoreIdentityAdapter::new(store),
        );

        let first = block_on(resolver.resolve_by_fingerprint(probe));
        let second = block_on(resolver.resolve_by_fingerprint(probe));

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.is_ok(), owners.values().any(|t| *t == probe));
    }
}
