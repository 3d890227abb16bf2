//! The `filter` module implements the declarative predicate applied to
//! messages, both for durable queries and for subscription matching.
//!
//! A filter maps an attribute name to a matcher: a scalar matches by exact
//! equality, an array matches by set membership. Dotted paths such as
//! `body.seq` address nested fields of the message body. The empty filter
//! matches every message.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Message;


/// A declarative predicate over message attributes, keyed by dotted path.
pub type Filter = HashMap<String, FilterValue>;

/// A matcher for a single filter entry.
///
/// Deserialization is shape-driven: a JSON array becomes `OneOf`, anything
/// else becomes `Equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    OneOf(Vec<Value>),
    Equals(Value),
}

impl FilterValue {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FilterValue::Equals(expected) => expected == value,
            FilterValue::OneOf(options) => options.iter().any(|option| option == value),
        }
    }
}

/// Evaluates a filter against a message.
///
/// Every entry must accept its attribute for the message to match; an
/// attribute absent from the message never matches. Pure and synchronous,
/// evaluated once per (message, filter) pair with no caching across messages.
pub fn matches(message: &Message, filter: &Filter) -> bool {
    filter.iter().all(|(path, matcher)| {
        lookup(message, path).is_some_and(|value| matcher.accepts(&value))
    })
}

/// Resolves a dotted attribute path against a message.
///
/// The first segment names a message attribute (`_id` is accepted as an
/// alias for `id`); remaining segments descend into the body's JSON
/// structure.
fn lookup(message: &Message, path: &str) -> Option<Value> {
    let mut segments = path.split('.');
    let root = match segments.next()? {
        "id" | "_id" => Value::String(message.id.clone()),
        "from" => Value::String(message.from.clone()),
        "type" => Value::String(message.message_type.clone()),
        "created_at" => serde_json::to_value(message.created_at).ok()?,
        "expires" => serde_json::to_value(message.expires).ok()?,
        "index_until" => serde_json::to_value(message.index_until).ok()?,
        "body" => Value::Object(message.body.clone()),
        _ => return None,
    };

    segments.try_fold(root, |value, segment| value.get(segment).cloned())
}
