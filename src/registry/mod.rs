//! The `registry` module tracks the live subscriptions of every connected
//! client.
//!
//! Subscriptions are scoped per connection: the caller-chosen id only has to
//! be unique within its own connection, and starting an id that is already
//! active on the same connection replaces it. When a connection closes, all
//! of its subscriptions are torn down at once so no dangling matches survive
//! a disconnect.
//!
//! The registry is the principal shared mutable resource of the service and
//! is held behind a lock by its owners. Dispatch takes a cloned snapshot and
//! releases the lock before doing any I/O, so a snapshot can be stale by at
//! most one concurrent start/stop: a subscription started concurrently with
//! a dispatch may miss that message, and one stopped concurrently may still
//! receive it. Both races are accepted.

use std::collections::HashMap;
use std::sync::Arc;

use crate::channel::DeliveryChannel;
use crate::filter::Filter;

#[cfg(test)]
mod tests;

/// Identifies one live connection; assigned by the transport.
pub type ConnectionId = String;

/// The only target type the dispatch engine fans out.
pub const TARGET_MESSAGE: &str = "message";

/// One live subscription: a filter bound to a connection's delivery channel.
#[derive(Clone)]
pub struct Subscription {
    pub id: String,
    pub connection: ConnectionId,
    pub filter: Filter,
    pub target_type: String,
    pub channel: Arc<dyn DeliveryChannel>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("connection", &self.connection)
            .field("filter", &self.filter)
            .field("target_type", &self.target_type)
            .finish()
    }
}

/// Tracks active subscriptions keyed by owning connection.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    connections: HashMap<ConnectionId, HashMap<String, Subscription>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Registers a subscription, replacing any prior subscription with the
    /// same id on the same connection.
    pub fn start(
        &mut self,
        connection: &str,
        id: &str,
        filter: Filter,
        target_type: &str,
        channel: Arc<dyn DeliveryChannel>,
    ) {
        let subscriptions = self.connections.entry(connection.to_string()).or_default();
        subscriptions.insert(
            id.to_string(),
            Subscription {
                id: id.to_string(),
                connection: connection.to_string(),
                filter,
                target_type: target_type.to_string(),
                channel,
            },
        );
    }

    /// Removes a subscription. A no-op when the id was never started or has
    /// already been stopped.
    pub fn stop(&mut self, connection: &str, id: &str) {
        if let Some(subscriptions) = self.connections.get_mut(connection) {
            subscriptions.remove(id);
            if subscriptions.is_empty() {
                self.connections.remove(connection);
            }
        }
    }

    /// Removes every subscription owned by a connection. Called exactly once
    /// per connection teardown.
    pub fn on_disconnect(&mut self, connection: &str) {
        self.connections.remove(connection);
    }

    /// Point-in-time snapshot of every active subscription, for dispatch.
    pub fn active_subscriptions(&self) -> Vec<Subscription> {
        self.connections
            .values()
            .flat_map(|subscriptions| subscriptions.values().cloned())
            .collect()
    }
}
