//! CSRF token configuration.

use serde::{Deserialize, Serialize};

/// CSRF token fetch, storage, and retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfConfig {
    /// Header attached to mutating requests.
    #[serde(default = "default_header_name")]
    pub header_name: String,
    /// Cookie (and storage key) the token is kept under.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Cookie `Max-Age` in seconds; also the freshness window of a token.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
    /// Background refresh period in seconds (`0` disables the refresher).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    /// Error codes in a 403 body that mark the rejection as CSRF-specific.
    #[serde(default = "default_rejection_codes")]
    pub rejection_codes: Vec<String>,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            header_name: default_header_name(),
            cookie_name: default_cookie_name(),
            max_age_seconds: default_max_age(),
            refresh_interval_seconds: default_refresh_interval(),
            rejection_codes: default_rejection_codes(),
        }
    }
}

fn default_header_name() -> String {
    "X-CSRF-Token".to_string()
}

fn default_cookie_name() -> String {
    "csrf_token".to_string()
}

fn default_max_age() -> u64 {
    3600
}

fn default_refresh_interval() -> u64 {
    600
}

fn default_rejection_codes() -> Vec<String> {
    vec![
        "CSRF_TOKEN_INVALID".to_string(),
        "CSRF_TOKEN_MISSING".to_string(),
        "CSRF_FAILED".to_string(),
    ]
}
