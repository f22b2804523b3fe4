//! Permission checks and route guard evaluation.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::app::App;
use crate::output::{self, OutputFormat};
use portcullis_auth::{GuardDecision, Location, ProtectedRoute, PublicRoute, RouteGuard};
use portcullis_core::error::AppError;

/// Arguments for `can`
#[derive(Debug, Args)]
pub struct CanArgs {
    /// Permission codes to check
    #[arg(required = true)]
    pub codes: Vec<String>,

    /// Pass if any code is held (default: all must be held)
    #[arg(long)]
    pub any: bool,

    /// Ask the backend about codes the local snapshot does not grant
    #[arg(long)]
    pub remote: bool,
}

/// Arguments for `route`
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Path being visited
    pub path: String,

    /// Required permission (repeatable)
    #[arg(short, long = "permission")]
    pub permissions: Vec<String>,

    /// Required role
    #[arg(short, long)]
    pub role: Option<String>,

    /// Evaluate as a public route (login page and similar)
    #[arg(long, conflicts_with_all = ["permissions", "role"])]
    pub public: bool,

    /// Captured origin path (`state.from`)
    #[arg(long)]
    pub from: Option<String>,
}

/// Permission display row
#[derive(Debug, Serialize, Tabled)]
struct PermissionRow {
    /// Permission code
    permission: String,
    /// Whether it is held
    granted: String,
}

/// Check permissions
pub async fn can(app: &App, args: &CanArgs, format: OutputFormat) -> Result<(), AppError> {
    let user = super::session::signed_in_user(app).await?;
    let gate = app.gate();

    let mut rows = Vec::with_capacity(args.codes.len());
    let mut granted = Vec::with_capacity(args.codes.len());
    for code in &args.codes {
        let held = if args.remote {
            gate.check_permission_remote(code).await?
        } else {
            gate.has_permission(code)
        };
        granted.push(held);
        rows.push(PermissionRow {
            permission: code.clone(),
            granted: if held { "✓" } else { "✗" }.to_string(),
        });
    }

    output::print_list(&rows, format);

    let passed = if args.any {
        granted.iter().any(|g| *g)
    } else {
        granted.iter().all(|g| *g)
    };
    if passed {
        Ok(())
    } else {
        Err(AppError::authorization(format!(
            "'{}' lacks the requested permissions",
            user.username
        )))
    }
}

/// Evaluate a route guard
pub async fn route(app: &App, args: &RouteArgs, format: OutputFormat) -> Result<(), AppError> {
    app.session.init().await;

    let mut location = Location::new(&args.path);
    if let Some(from) = &args.from {
        location = location.with_from(from);
    }

    let decision = if args.public {
        PublicRoute::new(&app.config.routes).evaluate(&app.session, &location)
    } else {
        let mut guard =
            ProtectedRoute::new(&app.config.routes).permissions(args.permissions.iter().cloned());
        if let Some(role) = &args.role {
            guard = guard.required_role(role);
        }
        guard.evaluate(&app.session, &location)
    };

    match format {
        OutputFormat::Json => output::print_json(&decision),
        OutputFormat::Table => match &decision {
            GuardDecision::Render => output::print_success(&format!("{} renders", args.path)),
            GuardDecision::Pending => output::print_warning("Session check still pending"),
            GuardDecision::Redirect(redirect) => {
                output::print_warning(&format!("{} redirects to {}", args.path, redirect.to));
                if let Some(from) = redirect.state.as_ref().and_then(|s| s.from.as_deref()) {
                    output::print_kv("state.from", from);
                }
            }
        },
    }
    Ok(())
}
