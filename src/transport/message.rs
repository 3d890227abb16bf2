use serde::Deserialize;

use crate::filter::Filter;
use crate::message::RawMessage;

/// Events a client may send over its connection.
///
/// `start` and `stop` manage subscriptions; `messages` submits a batch. The
/// batch reply comes back as a push on the caller-chosen `uniqueId` event,
/// and matched messages arrive as pushes on their subscription id.
#[derive(Debug, Deserialize)]
#[serde(tag = "event")]
pub enum ClientEvent {
    #[serde(rename = "start")]
    Start {
        id: String,
        #[serde(default)]
        filter: Filter,
        #[serde(rename = "type")]
        target_type: String,
    },

    #[serde(rename = "stop")]
    Stop { id: String },

    #[serde(rename = "messages")]
    Messages {
        #[serde(rename = "uniqueId")]
        unique_id: String,
        messages: Vec<RawMessage>,
    },
}
