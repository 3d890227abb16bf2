//! The `dispatch` module implements the message lifecycle engine: accepting
//! a batch of raw messages, persisting the valid ones, and fanning each
//! stored message out to every live subscription whose filter matches.
//!
//! Per batch the engine validates, persists, and fans out in submission
//! order, resolving an outcome per message: either the stored message with
//! its assigned id or the error that stopped it. The submitter's reply never
//! waits on subscriber delivery; pushes are fire-and-forget and a broken
//! subscriber is logged and skipped. The registry lock is only held long
//! enough to take a snapshot, never across store I/O or pushes.

use std::sync::{Arc, Mutex};

use tracing::{error, warn};

use crate::filter::{self, Filter};
use crate::message::{Message, RawMessage, RetentionPolicy};
use crate::persistence::{MessageStore, QueryOptions};
use crate::registry::{Subscription, SubscriptionRegistry, TARGET_MESSAGE};
use crate::utils::error::ServiceError;


/// Per-message result of a batch submission, positional with the input.
pub type Outcome = Result<Message, ServiceError>;

/// Accepts message batches and drives persistence plus real-time fan-out.
#[derive(Clone)]
pub struct DispatchEngine {
    store: Arc<dyn MessageStore>,
    registry: Arc<Mutex<SubscriptionRegistry>>,
    retention: RetentionPolicy,
}

impl DispatchEngine {
    pub fn new(
        store: Arc<dyn MessageStore>,
        registry: Arc<Mutex<SubscriptionRegistry>>,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            store,
            registry,
            retention,
        }
    }

    /// The registry this engine dispatches against, shared with the
    /// transport's connection lifecycle hooks.
    pub fn registry(&self) -> &Arc<Mutex<SubscriptionRegistry>> {
        &self.registry
    }

    /// Submits a batch of raw messages.
    ///
    /// Each message resolves independently: validation failures and storage
    /// failures fail that message only, the rest of the batch proceeds.
    /// Stored messages are fanned out to matching subscriptions in
    /// submission order before the outcomes are returned.
    pub fn submit(&self, batch: Vec<RawMessage>) -> Vec<Outcome> {
        let mut outcomes: Vec<Outcome> = batch
            .into_iter()
            .map(|raw| Message::validate(raw, &self.retention))
            .collect();

        for outcome in outcomes.iter_mut() {
            if let Ok(message) = outcome {
                match self.store.insert(message) {
                    Ok(id) => message.id = id,
                    Err(e) => *outcome = Err(e),
                }
            }
        }

        let snapshot = self.registry.lock().unwrap().active_subscriptions();
        for message in outcomes.iter().filter_map(|o| o.as_ref().ok()) {
            self.fan_out(message, &snapshot);
        }

        outcomes
    }

    /// Pushes a stored message to every matching subscription in the
    /// snapshot, tagged with the subscription's id. Push failures are
    /// logged, never propagated.
    fn fan_out(&self, message: &Message, subscriptions: &[Subscription]) {
        let payload = match serde_json::to_value(message) {
            Ok(value) => value,
            Err(e) => {
                error!("failed to serialize message {} for fan-out: {e}", message.id);
                return;
            }
        };

        for subscription in subscriptions {
            if subscription.target_type != TARGET_MESSAGE {
                continue;
            }
            if !filter::matches(message, &subscription.filter) {
                continue;
            }

            if let Err(e) = subscription.channel.push(&subscription.id, payload.clone()) {
                warn!(
                    "push to subscription {} on {} failed: {e}",
                    subscription.id, subscription.connection
                );
            }
        }
    }

    /// Queries the durable store; recency descending, `index_until`
    /// respected.
    pub fn query(&self, filter: &Filter, options: QueryOptions) -> Result<Vec<Message>, ServiceError> {
        self.store.query(filter, options)
    }

    /// Deletes matching messages from the durable store. The privileged
    /// principal check happens at the authorization seam before this is
    /// reached.
    pub fn remove(&self, filter: &Filter) -> Result<usize, ServiceError> {
        self.store.remove(filter)
    }
}
