//! Session persistence configuration.

use serde::{Deserialize, Serialize};

/// Session persistence and permission-evaluation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key/value storage backing the session.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Storage key holding the bearer token.
    #[serde(default = "default_token_key")]
    pub token_key: String,
    /// Storage key holding the JSON-encoded user profile.
    #[serde(default = "default_user_key")]
    pub user_key: String,
    /// Seconds subtracted from `exp` when checking expiry locally.
    #[serde(default)]
    pub expiry_leeway_seconds: i64,
    /// Role code that short-circuits every permission check.
    #[serde(default = "default_super_admin_role")]
    pub super_admin_role: String,
    /// Whether permission checks missing from the local snapshot are asked
    /// of the backend.
    #[serde(default)]
    pub remote_permission_fallback: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            token_key: default_token_key(),
            user_key: default_user_key(),
            expiry_leeway_seconds: 0,
            super_admin_role: default_super_admin_role(),
            remote_permission_fallback: false,
        }
    }
}

/// Which key/value storage backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-lifetime storage.
    #[default]
    Memory,
    /// JSON file on disk, shared by every process pointing at it.
    File,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::File => write!(f, "file"),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: StorageBackend,
    /// File path for the `file` backend.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

fn default_token_key() -> String {
    "auth_token".to_string()
}

fn default_user_key() -> String {
    "auth_user".to_string()
}

fn default_super_admin_role() -> String {
    "super_admin".to_string()
}

fn default_storage_path() -> String {
    "data/session.json".to_string()
}
