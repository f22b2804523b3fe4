//! Backend-issued identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A user identifier as returned by the backend.
///
/// Backends differ on whether ids are integers or strings; both are kept
/// verbatim so the user snapshot round-trips through storage unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    /// Integer primary key.
    Numeric(i64),
    /// Opaque string id (UUID, slug, ...).
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Numeric(id) => write!(f, "{id}"),
            UserId::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Numeric(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::Text(id.to_string())
    }
}
