//! The `transport` module is responsible for handling network communication
//! with clients via WebSockets.
//!
//! It defines the wire protocol (`start`/`stop` subscription events, batched
//! `messages` submissions correlated by `uniqueId`), implements the
//! WebSocket server, resolves each connection's credential through the auth
//! seam before any event is processed, and drives the registry's disconnect
//! hook when a connection closes.

pub mod message;
pub mod websocket;
