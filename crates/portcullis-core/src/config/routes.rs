//! Navigation targets used by the route guards.

use serde::{Deserialize, Serialize};

/// Redirect targets for guard decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Where unauthenticated visitors are sent.
    #[serde(default = "default_login")]
    pub login: String,
    /// Where authenticated users lacking rights are sent.
    #[serde(default = "default_forbidden")]
    pub forbidden: String,
    /// Where authenticated users land when no return path was captured.
    #[serde(default = "default_default")]
    pub default: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login: default_login(),
            forbidden: default_forbidden(),
            default: default_default(),
        }
    }
}

fn default_login() -> String {
    "/login".to_string()
}

fn default_forbidden() -> String {
    "/forbidden".to_string()
}

fn default_default() -> String {
    "/dashboard".to_string()
}
