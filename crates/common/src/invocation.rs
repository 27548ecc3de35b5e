//! Invocation identity.
//!
//! One invocation is a single stateless execution of the perform action.
//! Ids originating from a local/test harness carry a reserved prefix and
//! must never be forwarded to external provisioning systems.

use serde::{Deserialize, Serialize};

/// Prefix reserved for invocation ids minted by a local harness.
pub const LOCAL_PREFIX: &str = "local:";

/// Identifier for one invocation of the perform action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(String);

impl InvocationId {
    /// Mint a fresh id for an invocation that arrived without one.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Mint an id for a run started from a local harness. Such ids are
    /// kept out of any payload sent to external services.
    pub fn local() -> Self {
        Self(format!("{LOCAL_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    /// Whether this id came from a local harness.
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for InvocationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for InvocationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
