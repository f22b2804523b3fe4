//! CSRF token inspection.

use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::output::{self, OutputFormat};
use portcullis_core::error::AppError;

/// Arguments for `csrf`
#[derive(Debug, Args)]
pub struct CsrfArgs {
    /// Fetch a new token even if the cached one is fresh
    #[arg(long)]
    pub refresh: bool,

    /// Keep the token fresh at the configured interval until Ctrl-C
    #[arg(long)]
    pub watch: bool,
}

#[derive(Debug, Serialize)]
struct CsrfView {
    value: String,
    issued_at: String,
    expires_at: String,
    fresh: bool,
    cookie: String,
}

/// Show the CSRF token
pub async fn execute(app: &App, args: &CsrfArgs, format: OutputFormat) -> Result<(), AppError> {
    let token = if args.refresh {
        app.csrf.fetch_token().await?
    } else {
        app.csrf.ensure_token().await?
    };

    let view = CsrfView {
        value: token.value.clone(),
        issued_at: token.issued_at.to_rfc3339(),
        expires_at: token.expires_at().to_rfc3339(),
        fresh: token.is_fresh(),
        cookie: token.to_cookie(&app.csrf.config().cookie_name),
    };

    match format {
        OutputFormat::Json => output::print_json(&view),
        OutputFormat::Table => {
            if !view.fresh {
                output::print_warning("Using a stale token; the last refresh failed");
            }
            output::print_kv("Token", &view.value);
            output::print_kv("Issued", &view.issued_at);
            output::print_kv("Expires", &view.expires_at);
            output::print_kv("Cookie", &view.cookie);
        }
    }

    if args.watch {
        watch(app).await?;
    }
    Ok(())
}

async fn watch(app: &App) -> Result<(), AppError> {
    let Some(refresher) = app.csrf.start_refresher() else {
        return Err(AppError::configuration(
            "csrf.refresh_interval_seconds is 0, background refresh is disabled",
        ));
    };
    output::print_success(&format!(
        "Refreshing every {}s, press Ctrl-C to stop",
        app.csrf.config().refresh_interval_seconds
    ));

    let stopped = tokio::signal::ctrl_c().await;
    refresher.shutdown().await;
    stopped.map_err(|e| AppError::internal(format!("Failed to listen for Ctrl-C: {e}")))
}
