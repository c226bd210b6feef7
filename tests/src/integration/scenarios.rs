//! # Reader Scenarios
//!
//! One running gateway per test. Each scenario publishes reader messages on
//! the verification topics and checks what comes out on the unlock topic
//! and in the store. Store assertions run after `stop()`, once the handler
//! has finished its last message.

use chrono::TimeDelta;
use serde_json::{json, Value};
use shared_bus::{MessagePublisher, PublishError};

use super::harness::*;

fn with_jane(registered: bool) -> Value {
    let mut data = base_store();
    data["users"]["students"]["A1B2C3"] = json!({
        "name": "Jane Doe",
        "student_id": "2021-001",
        "registered": registered
    });
    data
}

#[tokio::test]
async fn test_card_allowed_unlocks_and_records_attendance() {
    let mut gateway = TestGateway::start(with_jane(true), TimeDelta::minutes(5)).await;

    gateway.send(CARD_TOPIC, &card_payload("A1B2C3")).await;

    let unlock = gateway.next_unlock().await.expect("unlock published");
    assert_eq!(unlock.topic, UNLOCK_TOPIC);
    assert_eq!(unlock.payload, b"OK");

    gateway.flush().await;
    gateway.stop().await;

    assert_eq!(gateway.pending_unlocks(), 0);
    assert_eq!(
        gateway.attendance("A1B2C3"),
        Some(json!({
            "method": "RFID",
            "name": "Jane Doe",
            "studentId": "2021-001",
            "timeIn": "300000"
        }))
    );
}

#[tokio::test]
async fn test_card_denied_for_unregistered_identity() {
    let mut gateway = TestGateway::start(with_jane(false), TimeDelta::minutes(5)).await;

    gateway.send(CARD_TOPIC, &card_payload("A1B2C3")).await;
    gateway.flush().await;
    gateway.stop().await;

    assert_eq!(gateway.pending_unlocks(), 0);
    assert_eq!(gateway.attendance("A1B2C3"), None);
    // The only write is the sentinel's.
    assert_eq!(gateway.store.writes(), 1);
}

#[tokio::test]
async fn test_fingerprint_not_found_publishes_nothing() {
    let mut data = with_jane(true);
    data["users"]["students"]["A1B2C3"]["fprints"] = json!({"7": true, "9999": false});
    let mut gateway = TestGateway::start(data, TimeDelta::minutes(5)).await;

    gateway
        .send(
            FINGERPRINT_TOPIC,
            &json!({"fingerprint_reader": 2, "fingerprint_id": 9999}),
        )
        .await;
    gateway.flush().await;
    gateway.stop().await;

    assert_eq!(gateway.pending_unlocks(), 0);
    assert_eq!(gateway.attendance("A1B2C3"), None);
}

#[tokio::test]
async fn test_fingerprint_match_records_fingerprint_method() {
    let mut data = with_jane(true);
    data["users"]["students"]["A1B2C3"]["fprints"] = json!({"7": true});
    let mut gateway = TestGateway::start(data, TimeDelta::seconds(90)).await;

    gateway
        .send(
            FINGERPRINT_TOPIC,
            &json!({"fingerprint_reader": 2, "fingerprint_id": 7}),
        )
        .await;

    assert!(gateway.next_unlock().await.is_some());
    gateway.flush().await;
    gateway.stop().await;

    let entry = gateway.attendance("A1B2C3").expect("attendance written");
    assert_eq!(entry["method"], json!("Fingerprint"));
    assert_eq!(entry["timeIn"], json!("90000"));
}

#[tokio::test]
async fn test_malformed_event_performs_no_lookup() {
    // Baseline: the sentinel alone.
    let mut baseline = TestGateway::start(with_jane(true), TimeDelta::minutes(5)).await;
    baseline.flush().await;
    baseline.stop().await;

    let mut gateway = TestGateway::start(with_jane(true), TimeDelta::minutes(5)).await;
    gateway
        .send(CARD_TOPIC, &json!({"card_reader": "1", "card_id": "A1B2C3"}))
        .await;
    gateway.flush().await;
    gateway.stop().await;

    assert_eq!(gateway.store.reads(), baseline.store.reads());
    assert_eq!(gateway.pending_unlocks(), 0);
    assert_eq!(gateway.attendance("A1B2C3"), None);
}

#[tokio::test]
async fn test_garbage_payload_does_not_stop_the_handler() {
    let mut gateway = TestGateway::start(with_jane(true), TimeDelta::minutes(5)).await;

    gateway.send_raw(CARD_TOPIC, b"\xff\xfe not json").await;
    gateway.send_raw(FINGERPRINT_TOPIC, b"[1, 2, 3]").await;
    gateway.send(CARD_TOPIC, &card_payload("A1B2C3")).await;

    assert!(gateway.next_unlock().await.is_some());
    gateway.flush().await;
    gateway.stop().await;

    assert!(gateway.attendance("A1B2C3").is_some());
}

#[tokio::test]
async fn test_no_active_session_keeps_unlock_without_attendance() {
    let mut data = with_jane(true);
    data["sessions"]["active"] = Value::Null;
    let mut gateway = TestGateway::start(data, TimeDelta::minutes(5)).await;

    gateway.send(CARD_TOPIC, &card_payload("A1B2C3")).await;

    assert!(gateway.next_unlock().await.is_some());
    gateway.flush().await;
    gateway.stop().await;

    assert_eq!(gateway.pending_unlocks(), 0);
    assert_eq!(gateway.store.writes(), 0);
}

#[tokio::test]
async fn test_replay_overwrites_attendance_entry() {
    let mut gateway = TestGateway::start(with_jane(true), TimeDelta::minutes(5)).await;

    gateway.send(CARD_TOPIC, &card_payload("A1B2C3")).await;
    assert!(gateway.next_unlock().await.is_some());
    gateway.flush().await;

    gateway.clock.advance(TimeDelta::minutes(10));
    gateway.send(CARD_TOPIC, &card_payload("A1B2C3")).await;
    assert!(gateway.next_unlock().await.is_some());
    gateway.flush().await;
    gateway.stop().await;

    let attendance = gateway
        .store
        .peek(&format!("sessions/{SESSION_KEY}/attendance"))
        .unwrap();
    let entries = attendance.as_object().unwrap();
    assert_eq!(entries.len(), 2, "Jane and the sentinel, once each");
    assert_eq!(entries["A1B2C3"]["timeIn"], json!("900000"));
}

#[tokio::test]
async fn test_shutdown_closes_the_transport() {
    let gateway = TestGateway::start(with_jane(true), TimeDelta::minutes(5)).await;

    gateway.stop().await;

    assert_eq!(
        gateway.broker.publish(CARD_TOPIC, b"{}").await,
        Err(PublishError::Closed)
    );
}
