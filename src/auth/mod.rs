//! The `auth` module defines the capability-check seam the transport
//! consults before any request reaches the dispatch engine.
//!
//! The engine itself performs no authorization logic: it trusts the decision
//! produced here as a precondition. The trait is the contract; the static
//! token resolver is the implementation the binary wires up from
//! configuration, and real deployments substitute their own.

use std::collections::HashMap;

use serde::Deserialize;


/// An authenticated actor that owns or acts upon messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: String,
    pub kind: PrincipalKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Device,
    User,
    Service,
}

impl Principal {
    pub fn is_service(&self) -> bool {
        self.kind == PrincipalKind::Service
    }
}

/// Operations a credential can be authorized for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Subscribe,
    SubmitMessages,
    QueryMessages,
    RemoveMessages,
}

/// The permission decision for one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allowed(Principal),
    Forbidden,
    Unauthenticated,
}

/// Resolves a request credential to a permission decision.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, credential: Option<&str>, operation: Operation) -> Decision;
}

/// Token-to-principal resolver backed by a fixed table.
///
/// Message removal is restricted to service principals; every other
/// operation is allowed to any authenticated principal.
#[derive(Debug, Default)]
pub struct StaticTokenAuthorizer {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, token: &str, principal: Principal) {
        self.tokens.insert(token.to_string(), principal);
    }
}

impl Authorizer for StaticTokenAuthorizer {
    fn authorize(&self, credential: Option<&str>, operation: Operation) -> Decision {
        let Some(token) = credential else {
            return Decision::Unauthenticated;
        };
        let Some(principal) = self.tokens.get(token) else {
            return Decision::Unauthenticated;
        };

        if operation == Operation::RemoveMessages && !principal.is_service() {
            return Decision::Forbidden;
        }

        Decision::Allowed(principal.clone())
    }
}
