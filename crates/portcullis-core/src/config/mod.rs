//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `PORTCULLIS__`-prefixed environment variables. Every field
//! has a serde default, so an empty source yields [`AppConfig::default`].

pub mod api;
pub mod csrf;
pub mod logging;
pub mod routes;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::api::{ApiConfig, EndpointsConfig};
pub use self::csrf::CsrfConfig;
pub use self::logging::LoggingConfig;
pub use self::routes::RoutesConfig;
pub use self::session::{SessionConfig, StorageBackend, StorageConfig};

use crate::error::AppError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Session persistence and permission settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Navigation targets used by route guards.
    #[serde(default)]
    pub routes: RoutesConfig,
    /// CSRF token handling.
    #[serde(default)]
    pub csrf: CsrfConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `path` (optional), an environment overlay `config/<env>`
    /// (optional) and environment variables prefixed with `PORTCULLIS__`.
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("PORTCULLIS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("csrf.rejection_codes"),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        tracing::debug!(
            path,
            env = env.unwrap_or("-"),
            base_url = %config.api.base_url,
            storage = %config.session.storage.backend,
            "Configuration loaded"
        );
        Ok(config)
    }
}
