//! # Signalpost
//!
//! `signalpost` is a message service for networked principals (devices,
//! users, and services). Messages are typed, addressable units of data that
//! are stored durably and queryable by filter, while every live subscription
//! whose filter matches receives them as a real-time push.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `message`: The validated message entity with its lifecycle fields and retention sentinels.
//! - `filter`: The declarative predicate evaluated against messages for queries and subscriptions.
//! - `registry`: Tracks the live subscriptions of every connected client.
//! - `dispatch`: The engine that validates, persists, and fans out each submitted batch.
//! - `persistence`: The durable message store (currently backed by `sled`).
//! - `channel`: The delivery seam between the engine and the transport.
//! - `auth`: The capability-check contract consulted before the engine is invoked.
//! - `transport`: The WebSocket server and wire protocol.
//! - `config`: Handles loading and managing server configuration.
//! - `utils`: Shared error taxonomy and logging setup.

pub mod auth;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod filter;
pub mod message;
pub mod persistence;
pub mod registry;
pub mod transport;
pub mod utils;
