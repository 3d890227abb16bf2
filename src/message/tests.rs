use chrono::{Duration, Utc};
use serde_json::json;

use super::{Message, RawMessage, RetentionPolicy, index_forever, never_expire};
use crate::utils::error::ServiceError;

fn raw(from: &str, message_type: &str) -> RawMessage {
    RawMessage {
        from: Some(from.to_string()),
        message_type: Some(message_type.to_string()),
        body: Some(json!({ "seq": 1 })),
        ..Default::default()
    }
}

#[test]
fn test_validate_echoes_fields_without_assigning_id() {
    let message = Message::validate(raw("device-1", "_custom"), &RetentionPolicy::default())
        .expect("valid message");

    assert_eq!(message.from, "device-1");
    assert_eq!(message.message_type, "_custom");
    assert_eq!(message.body.get("seq"), Some(&json!(1)));
    assert!(message.id.is_empty());
}

#[test]
fn test_validate_rejects_missing_from() {
    let mut input = raw("device-1", "_custom");
    input.from = None;

    let err = Message::validate(input, &RetentionPolicy::default()).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn test_validate_rejects_empty_type() {
    let mut input = raw("device-1", "_custom");
    input.message_type = Some(String::new());

    let err = Message::validate(input, &RetentionPolicy::default()).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn test_validate_rejects_non_object_body() {
    let mut input = raw("device-1", "_custom");
    input.body = Some(json!("not an object"));

    let err = Message::validate(input, &RetentionPolicy::default()).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn test_validate_allows_absent_body() {
    let mut input = raw("device-1", "_custom");
    input.body = None;

    let message = Message::validate(input, &RetentionPolicy::default()).expect("valid message");
    assert!(message.body.is_empty());
}

#[test]
fn test_validate_stamps_created_at_and_defaults_retention() {
    let retention = RetentionPolicy {
        default_expires: Duration::seconds(60),
        default_index: Duration::seconds(600),
    };

    let before = Utc::now();
    let message = Message::validate(raw("device-1", "_custom"), &retention).expect("valid message");
    let after = Utc::now();

    assert!(message.created_at >= before && message.created_at <= after);
    assert_eq!(message.expires, message.created_at + Duration::seconds(60));
    assert_eq!(message.index_until, message.created_at + Duration::seconds(600));
}

#[test]
fn test_validate_normalizes_string_sentinels() {
    let mut input = raw("device-1", "_custom");
    input.expires = Some(json!("never"));
    input.index_until = Some(json!("forever"));

    let message = Message::validate(input, &RetentionPolicy::default()).expect("valid message");
    assert_eq!(message.expires, never_expire());
    assert_eq!(message.index_until, index_forever());
}

#[test]
fn test_validate_parses_concrete_timestamps() {
    let mut input = raw("device-1", "_custom");
    input.created_at = Some("2026-01-01T00:00:00Z".parse().unwrap());
    input.expires = Some(json!("2026-01-02T00:00:00Z"));

    let message = Message::validate(input, &RetentionPolicy::default()).expect("valid message");
    assert_eq!(
        message.expires,
        "2026-01-02T00:00:00Z".parse::<chrono::DateTime<Utc>>().unwrap()
    );
}

#[test]
fn test_validate_rejects_expires_before_created_at() {
    let mut input = raw("device-1", "_custom");
    input.created_at = Some("2026-01-02T00:00:00Z".parse().unwrap());
    input.expires = Some(json!("2026-01-01T00:00:00Z"));

    let err = Message::validate(input, &RetentionPolicy::default()).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn test_validate_rejects_garbage_lifecycle_value() {
    let mut input = raw("device-1", "_custom");
    input.expires = Some(json!({ "at": "later" }));

    let err = Message::validate(input, &RetentionPolicy::default()).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn test_underscore_types_pass_through_unmodified() {
    let message = Message::validate(raw("device-1", "_sensorReading"), &RetentionPolicy::default())
        .expect("valid message");
    assert_eq!(message.message_type, "_sensorReading");
}
