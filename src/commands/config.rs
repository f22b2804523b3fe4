//! Effective configuration display.

use crate::output::{self, OutputFormat};
use portcullis_core::config::AppConfig;
use portcullis_core::error::AppError;

/// Print the merged configuration
pub fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => output::print_json(config),
        OutputFormat::Table => {
            output::print_kv("api.base_url", &config.api.base_url);
            output::print_kv("api.timeout_seconds", &config.api.timeout_seconds.to_string());
            output::print_kv(
                "session.storage",
                &format!(
                    "{} ({})",
                    config.session.storage.backend, config.session.storage.path
                ),
            );
            output::print_kv("session.super_admin", &config.session.super_admin_role);
            output::print_kv(
                "session.remote_check",
                &config.session.remote_permission_fallback.to_string(),
            );
            output::print_kv("routes.login", &config.routes.login);
            output::print_kv("routes.forbidden", &config.routes.forbidden);
            output::print_kv("routes.default", &config.routes.default);
            output::print_kv("csrf.header_name", &config.csrf.header_name);
            output::print_kv(
                "csrf.refresh_interval",
                &format!("{}s", config.csrf.refresh_interval_seconds),
            );
            output::print_kv("logging.level", &config.logging.level);
        }
    }
    Ok(())
}
