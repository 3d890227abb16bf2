//! The `error` module defines the error taxonomy used across the service.
//!
//! Every fallible operation resolves to a `ServiceError`. Validation and
//! storage failures are reported per message inside a batch reply;
//! authentication and authorization failures abort a request before the
//! dispatch engine is ever invoked.

use thiserror::Error;

/// Service-wide error taxonomy.
///
/// `Validation` and `Storage` are resolved per individual message and never
/// abort a whole batch. `Authentication` and `Authorization` are request
/// preconditions. `NotFound` covers query/delete targets that do not exist.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("principal is not authorized: {0}")]
    Authorization(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<sled::Error> for ServiceError {
    fn from(err: sled::Error) -> Self {
        ServiceError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Storage(err.to_string())
    }
}
