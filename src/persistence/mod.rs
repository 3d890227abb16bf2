//! The `persistence` module provides the durable side of the message
//! lifecycle: insertion, filter-driven queries, filter-driven removal, and
//! garbage collection of expired messages.
//!
//! The `MessageStore` trait is the gateway the rest of the service programs
//! against; `sled_store` implements it with `sled` as an embedded key-value
//! store. Queries respect `index_until` (a message past its index window is
//! invisible), while `expires` governs when the expiry sweep deletes the row
//! outright.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::filter::Filter;
use crate::message::Message;
use crate::utils::error::ServiceError;

pub mod sled_store;

pub use sled_store::SledStore;


/// Hard cap on query result size, applied even when the caller asks for more.
pub const QUERY_LIMIT_CAP: usize = 10_000;

/// Caller-supplied query options. A missing limit falls back to the cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    pub limit: Option<usize>,
}

impl QueryOptions {
    /// Effective result limit, never above `QUERY_LIMIT_CAP`.
    pub fn effective_limit(&self) -> usize {
        self.limit.map_or(QUERY_LIMIT_CAP, |l| l.min(QUERY_LIMIT_CAP))
    }
}

/// Abstract durable store for messages.
///
/// Any I/O or constraint failure surfaces as `ServiceError::Storage`, never
/// silently dropped. Implementations must be safe to share across tasks.
pub trait MessageStore: Send + Sync {
    /// Writes a message durably, assigning its id. Returns the assigned id.
    fn insert(&self, message: &Message) -> Result<String, ServiceError>;

    /// Returns matching messages ordered by insertion recency descending,
    /// excluding messages whose `index_until` has passed.
    fn query(&self, filter: &Filter, options: QueryOptions) -> Result<Vec<Message>, ServiceError>;

    /// Deletes matching messages, returning how many were removed.
    fn remove(&self, filter: &Filter) -> Result<usize, ServiceError>;

    /// Deletes messages whose `expires` instant has passed, returning how
    /// many were collected.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, ServiceError>;
}

/// Background garbage collection of expired messages.
///
/// Runs forever; intended to be spawned once at startup.
pub async fn run_expiry_sweep(store: Arc<dyn MessageStore>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;

        match store.purge_expired(Utc::now()) {
            Ok(0) => {}
            Ok(count) => debug!("expiry sweep removed {count} messages"),
            Err(e) => warn!("expiry sweep failed: {e}"),
        }
    }
}
