//! The `message` module defines the message entity and its lifecycle fields.
//!
//! A message is the unit of data exchanged between principals. It carries an
//! owner (`from`), a type tag, an opaque structured body, and three lifecycle
//! instants: `created_at`, `expires` (how long the message exists durably),
//! and `index_until` (how long it stays visible to queries). Real-time
//! delivery is always attempted exactly once at creation, independent of the
//! lifecycle fields.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::error::ServiceError;

#[cfg(test)]
mod tests;

/// 9999-12-31T23:59:59Z, used for both retention sentinels.
const FAR_FUTURE_SECS: i64 = 253_402_300_799;

/// Sentinel instant for messages that are never garbage collected.
///
/// The raw string `"never"` in a submitted message normalizes to this value.
pub fn never_expire() -> DateTime<Utc> {
    DateTime::from_timestamp(FAR_FUTURE_SECS, 0).expect("sentinel timestamp is valid")
}

/// Sentinel instant for messages that stay queryable forever.
///
/// The raw string `"forever"` in a submitted message normalizes to this value.
pub fn index_forever() -> DateTime<Utc> {
    DateTime::from_timestamp(FAR_FUTURE_SECS, 0).expect("sentinel timestamp is valid")
}

/// Default retention applied when a submitted message leaves `expires` or
/// `index_until` unset.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub default_expires: Duration,
    pub default_index: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            default_expires: Duration::days(1),
            default_index: Duration::days(7),
        }
    }
}

/// A message as submitted by a caller, before validation.
///
/// All fields are optional at this stage; `validate` decides which absences
/// are errors and which fall back to defaults. The `expires` and
/// `index_until` fields accept either an RFC 3339 timestamp or the string
/// sentinels `"never"` / `"forever"`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawMessage {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(rename = "type", default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires: Option<Value>,
    #[serde(default)]
    pub index_until: Option<Value>,
}

/// A validated message.
///
/// `id` is assigned exactly once, by the store at insert time; before that it
/// is empty. `from` and `type` are always present and non-empty. Types
/// prefixed with `_` are application-defined and pass through the service
/// unmodified; unprefixed types may carry system meaning (for example `ip`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    pub from: String,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub body: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub expires: DateTime<Utc>,
    pub index_until: DateTime<Utc>,
}

impl Message {
    /// Validates and normalizes a raw message.
    ///
    /// Fails with `ServiceError::Validation` when `from` or `type` is missing
    /// or empty, when `body` is present but not a JSON object, or when a
    /// concrete `expires` precedes `created_at`. String sentinels are mapped
    /// to their sentinel instants, absent lifecycle fields fall back to the
    /// retention policy, and `created_at` is stamped when the caller did not
    /// provide one. Pure transformation, no side effects.
    pub fn validate(raw: RawMessage, retention: &RetentionPolicy) -> Result<Message, ServiceError> {
        let from = raw
            .from
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ServiceError::Validation("message requires a from principal".into()))?;

        let message_type = raw
            .message_type
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Validation("message requires a type".into()))?;

        let body = match raw.body {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ServiceError::Validation(
                    "message body must be an object".into(),
                ));
            }
        };

        let created_at = raw.created_at.unwrap_or_else(Utc::now);

        let expires = normalize_instant(
            raw.expires,
            "expires",
            "never",
            never_expire(),
            created_at + retention.default_expires,
        )?;

        let index_until = normalize_instant(
            raw.index_until,
            "index_until",
            "forever",
            index_forever(),
            created_at + retention.default_index,
        )?;

        if expires < created_at {
            return Err(ServiceError::Validation(
                "message expires before it is created".into(),
            ));
        }

        Ok(Message {
            id: String::new(),
            from,
            message_type,
            body,
            created_at,
            expires,
            index_until,
        })
    }
}

/// Resolves a raw lifecycle field to a concrete instant.
///
/// Accepts the field's string sentinel, an RFC 3339 timestamp, or nothing
/// (which falls back to `default`). Anything else is a validation error.
fn normalize_instant(
    value: Option<Value>,
    field: &str,
    sentinel_word: &str,
    sentinel: DateTime<Utc>,
    default: DateTime<Utc>,
) -> Result<DateTime<Utc>, ServiceError> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(s)) if s == sentinel_word => Ok(sentinel),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| {
                ServiceError::Validation(format!(
                    "{field} must be an RFC 3339 timestamp or \"{sentinel_word}\""
                ))
            }),
        Some(_) => Err(ServiceError::Validation(format!(
            "{field} must be an RFC 3339 timestamp or \"{sentinel_word}\""
        ))),
    }
}
