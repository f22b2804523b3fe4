//! Backend API configuration.

use serde::{Deserialize, Serialize};

/// Backend API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Endpoint paths relative to `base_url`.
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

/// Paths of the collaborator-owned endpoints this layer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Credential login (`POST`).
    #[serde(default = "default_login")]
    pub login: String,
    /// Logout notification (`POST`).
    #[serde(default = "default_logout")]
    pub logout: String,
    /// Token verification (`GET`).
    #[serde(default = "default_verify")]
    pub verify: String,
    /// CSRF token issue (`GET`).
    #[serde(default = "default_csrf")]
    pub csrf: String,
    /// Remote permission check (`GET`, `?permission=<code>`).
    #[serde(default = "default_check_permission")]
    pub check_permission: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            login: default_login(),
            logout: default_logout(),
            verify: default_verify(),
            csrf: default_csrf(),
            check_permission: default_check_permission(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_login() -> String {
    "/auth/login".to_string()
}

fn default_logout() -> String {
    "/auth/logout".to_string()
}

fn default_verify() -> String {
    "/auth/verify-token".to_string()
}

fn default_csrf() -> String {
    "/csrf-token".to_string()
}

fn default_check_permission() -> String {
    "/auth/check-permission".to_string()
}
