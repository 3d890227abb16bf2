//! The `channel` module defines the seam between the dispatch engine and the
//! real-time transport.
//!
//! A `DeliveryChannel` is one end of a bidirectional connection to a
//! subscriber. Pushes are fire-and-forget: the engine records a failure and
//! moves on, it never waits for acknowledgment and a broken subscriber must
//! not stall the fan-out loop.

use serde_json::Value;
use thiserror::Error;

/// Returned when a push cannot be handed to the connection anymore,
/// typically because the peer has gone away.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("delivery channel closed: {0}")]
pub struct ChannelClosed(pub String);

/// Outbound half of a real-time connection.
///
/// `push` must be non-blocking; implementations queue the frame and let a
/// dedicated writer task drain it.
pub trait DeliveryChannel: Send + Sync {
    fn push(&self, event: &str, payload: Value) -> Result<(), ChannelClosed>;
}
