//! # SmartGuard Pipeline Benchmarks
//!
//! | Stage | Cost model |
//! |-------|------------|
//! | Message validation | fixed schema, O(fields) |
//! | Fingerprint template scan | O(identities) per event |
//! | Full card route (in-memory store) | validate + 1 identity read + attendance |

use std::sync::Arc;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gateway_runtime::adapters::InMemoryStore;
use gateway_runtime::container::{GatewayConfig, GatewayContext, StoreStatus};
use gateway_runtime::wiring::EventRouter;
use serde_json::{json, Map, Value};
use sg_01_message_validation::{validate, EventKind};
use sg_02_identity_resolution::find_template_owner;
use sg_04_attendance::FixedTimeSource;
use shared_bus::{InMemoryBroker, TransportMessage};

fn students(count: usize) -> Value {
    let records: Map<String, Value> = (0..count)
        .map(|i| {
            (
                format!("CARD{i:06}"),
                json!({
                    "name": format!("Student {i}"),
                    "student_id": format!("2021-{i:04}"),
                    "registered": true,
                    "fprints": {(i + 1).to_string(): true}
                }),
            )
        })
        .collect();
    Value::Object(records)
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sg-01-message-validation");

    let card = json!({"card_reader": 1, "card_id": "A1B2C3"});
    group.bench_function("validate_card", |b| {
        b.iter(|| validate(EventKind::Card, black_box(&card)))
    });

    let broken = json!({"fingerprint_reader": "2", "extra": [1, 2, 3]});
    group.bench_function("reject_fingerprint", |b| {
        b.iter(|| validate(EventKind::Fingerprint, black_box(&broken)))
    });

    group.finish();
}

fn bench_template_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("sg-02-template-scan");

    for size in [100, 1_000, 10_000] {
        let collection = students(size);
        group.throughput(Throughput::Elements(size as u64));
        // Worst case: the last record owns the template.
        group.bench_with_input(BenchmarkId::new("last_owner", size), &size, |b, &size| {
            b.iter(|| find_template_owner(black_box(&collection), size as i64))
        });
    }

    group.finish();
}

fn bench_card_route(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = Arc::new(InMemoryStore::with_data(json!({
        "users": {"students": students(1_000)},
        "sessions": {
            "active": {"firebaseKey": "-Nbench"},
            "-Nbench": {"started": "2025-03-01T08:00:00Z"}
        }
    })));
    let router = EventRouter::over_store(
        Arc::new(GatewayContext::new(
            GatewayConfig::default(),
            StoreStatus::Available,
        )),
        store,
        Arc::new(FixedTimeSource::new(Utc::now())),
        Arc::new(InMemoryBroker::new()),
    );
    let message = TransportMessage::new(
        "verify/card",
        json!({"card_reader": 1, "card_id": "CARD000500"}).to_string(),
    );

    c.bench_function("gateway_route_card", |b| {
        b.iter(|| runtime.block_on(router.route(black_box(&message))))
    });
}

criterion_group!(
    benches,
    bench_validation,
    bench_template_scan,
    bench_card_route
);
criterion_main!(benches);
