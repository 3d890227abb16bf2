//! Message store backed by `sled`
//!
//! Each message is stored as serialized JSON under a key prefixed with its
//! `created_at` timestamp, so a reverse scan yields messages newest first.
//! A uuid suffix keeps keys unique for messages created in the same
//! millisecond; the same uuid becomes the message id.

use chrono::{DateTime, Utc};
use sled::Db;
use uuid::Uuid;

use crate::filter::{self, Filter};
use crate::message::Message;
use crate::persistence::{MessageStore, QueryOptions};
use crate::utils::error::ServiceError;

/// Durable message store on top of a sled database.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Opens or creates the sled database at `path`.
    pub fn open(path: &str) -> Result<Self, ServiceError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn key(created_at: DateTime<Utc>, id: &str) -> String {
        format!("{:020}_{}", created_at.timestamp_millis(), id)
    }
}

impl MessageStore for SledStore {
    fn insert(&self, message: &Message) -> Result<String, ServiceError> {
        let id = Uuid::new_v4().to_string();

        let mut stored = message.clone();
        stored.id = id.clone();

        let key = Self::key(stored.created_at, &id);
        let bytes = serde_json::to_vec(&stored)?;
        self.db.insert(key.as_bytes(), bytes)?;

        Ok(id)
    }

    fn query(&self, filter: &Filter, options: QueryOptions) -> Result<Vec<Message>, ServiceError> {
        let now = Utc::now();
        let limit = options.effective_limit();
        let mut out = Vec::new();

        for entry in self.db.iter().rev() {
            let (_, value) = entry?;
            let message: Message = serde_json::from_slice(&value)?;

            if message.index_until < now {
                continue;
            }
            if !filter::matches(&message, filter) {
                continue;
            }

            out.push(message);
            if out.len() >= limit {
                break;
            }
        }

        Ok(out)
    }

    fn remove(&self, filter: &Filter) -> Result<usize, ServiceError> {
        let mut doomed = Vec::new();

        for entry in self.db.iter() {
            let (key, value) = entry?;
            let message: Message = serde_json::from_slice(&value)?;
            if filter::matches(&message, filter) {
                doomed.push(key);
            }
        }

        let mut removed = 0;
        for key in doomed {
            if self.db.remove(key)?.is_some() {
                removed += 1;
            }
        }

        Ok(removed)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, ServiceError> {
        let mut doomed = Vec::new();

        for entry in self.db.iter() {
            let (key, value) = entry?;
            let message: Message = serde_json::from_slice(&value)?;
            if message.expires < now {
                doomed.push(key);
            }
        }

        let mut removed = 0;
        for key in doomed {
            if self.db.remove(key)?.is_some() {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore").field("db", &"sled::Db").finish()
    }
}
