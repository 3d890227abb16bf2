use std::sync::Arc;

use serde_json::json;

use super::{SubscriptionRegistry, TARGET_MESSAGE};
use crate::channel::{ChannelClosed, DeliveryChannel};
use crate::filter::{Filter, FilterValue};

struct NullChannel;

impl DeliveryChannel for NullChannel {
    fn push(&self, _event: &str, _payload: serde_json::Value) -> Result<(), ChannelClosed> {
        Ok(())
    }
}

fn channel() -> Arc<dyn DeliveryChannel> {
    Arc::new(NullChannel)
}

fn type_filter(message_type: &str) -> Filter {
    Filter::from([(
        "type".to_string(),
        FilterValue::Equals(json!(message_type)),
    )])
}

#[test]
fn test_start_registers_a_subscription() {
    let mut registry = SubscriptionRegistry::new();
    registry.start("conn-1", "sub1", type_filter("_t"), TARGET_MESSAGE, channel());

    let active = registry.active_subscriptions();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "sub1");
    assert_eq!(active[0].connection, "conn-1");
}

#[test]
fn test_start_replaces_same_id_on_same_connection() {
    let mut registry = SubscriptionRegistry::new();
    registry.start("conn-1", "sub1", type_filter("_a"), TARGET_MESSAGE, channel());
    registry.start("conn-1", "sub1", type_filter("_b"), TARGET_MESSAGE, channel());

    let active = registry.active_subscriptions();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].filter, type_filter("_b"));
}

#[test]
fn test_same_id_on_different_connections_coexists() {
    let mut registry = SubscriptionRegistry::new();
    registry.start("conn-1", "sub1", type_filter("_a"), TARGET_MESSAGE, channel());
    registry.start("conn-2", "sub1", type_filter("_b"), TARGET_MESSAGE, channel());

    assert_eq!(registry.active_subscriptions().len(), 2);
}

#[test]
fn test_stop_is_idempotent() {
    let mut registry = SubscriptionRegistry::new();
    registry.start("conn-1", "sub1", Filter::new(), TARGET_MESSAGE, channel());

    registry.stop("conn-1", "sub1");
    registry.stop("conn-1", "sub1");
    registry.stop("conn-1", "never-started");

    assert!(registry.active_subscriptions().is_empty());
}

#[test]
fn test_on_disconnect_removes_everything_for_the_connection() {
    let mut registry = SubscriptionRegistry::new();
    registry.start("conn-1", "sub1", Filter::new(), TARGET_MESSAGE, channel());
    registry.start("conn-1", "sub2", Filter::new(), TARGET_MESSAGE, channel());
    registry.start("conn-2", "sub1", Filter::new(), TARGET_MESSAGE, channel());

    registry.on_disconnect("conn-1");

    let active = registry.active_subscriptions();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].connection, "conn-2");
}

#[test]
fn test_snapshot_reflects_state_at_call_time() {
    let mut registry = SubscriptionRegistry::new();
    registry.start("conn-1", "sub1", Filter::new(), TARGET_MESSAGE, channel());

    let before = registry.active_subscriptions();
    registry.stop("conn-1", "sub1");
    let after = registry.active_subscriptions();

    assert_eq!(before.len(), 1);
    assert!(after.is_empty());
}
