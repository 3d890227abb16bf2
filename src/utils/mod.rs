//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `signalpost` application.
//!
//! This module centralizes the error taxonomy and logging setup so that
//! every other module reports failures and emits diagnostics consistently.

pub mod error;
pub mod logging;
