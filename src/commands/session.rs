//! Session lifecycle commands: login, logout, status, whoami.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::app::App;
use crate::output::{self, OutputFormat};
use portcullis_auth::AuthState;
use portcullis_core::error::AppError;
use portcullis_core::types::User;

/// Arguments for login
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username
    pub username: String,

    /// Password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Session summary
#[derive(Debug, Serialize)]
struct StatusView {
    state: &'static str,
    username: Option<String>,
    expires_at: Option<String>,
    remaining_seconds: Option<i64>,
}

/// Role display row
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role code
    code: String,
    /// Display name
    name: String,
    /// Permissions carried by the role
    permissions: String,
}

/// Sign in
pub async fn login(app: &App, args: &LoginArgs) -> Result<(), AppError> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
    };

    let user = app.session.authenticate(&args.username, &password).await?;
    output::print_success(&format!("Signed in as '{}'", user.username));
    Ok(())
}

/// Sign out
pub async fn logout(app: &App) -> Result<(), AppError> {
    app.session.logout().await;
    output::print_success("Signed out");
    Ok(())
}

/// Run the boot check and report the resulting state
pub async fn status(app: &App, format: OutputFormat) -> Result<(), AppError> {
    let state = app.session.init().await;
    let session = state.session();
    let view = StatusView {
        state: state.label(),
        username: session.map(|s| s.user.username.clone()),
        expires_at: session.and_then(|s| s.expires_at).map(|t| t.to_rfc3339()),
        remaining_seconds: session.and_then(|s| s.remaining_seconds()),
    };

    match format {
        OutputFormat::Json => output::print_json(&view),
        OutputFormat::Table => {
            output::print_kv("State", view.state);
            if let Some(username) = &view.username {
                output::print_kv("User", username);
            }
            output::print_kv(
                "Expires",
                view.expires_at.as_deref().unwrap_or("never (no exp claim)"),
            );
            if let Some(remaining) = view.remaining_seconds {
                output::print_kv("Remaining", &format!("{remaining}s"));
            }
        }
    }
    Ok(())
}

/// Show the verified user
pub async fn whoami(app: &App, format: OutputFormat) -> Result<(), AppError> {
    let user = signed_in_user(app).await?;

    match format {
        OutputFormat::Json => output::print_json(&user),
        OutputFormat::Table => {
            output::print_kv("User", &user.username);
            output::print_kv("Id", &user.id.to_string());
            if let Some(email) = &user.email {
                output::print_kv("Email", email);
            }
            output::print_kv("Role", &user.role);
            output::print_kv("Direct permissions", &join(user.permissions.iter()));
            println!();
            let rows: Vec<RoleRow> = user
                .roles
                .iter()
                .map(|r| RoleRow {
                    code: r.code.clone(),
                    name: r.name.clone().unwrap_or_default(),
                    permissions: join(r.permissions.iter()),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}

/// Boot and require an authenticated session
pub async fn signed_in_user(app: &App) -> Result<User, AppError> {
    match app.session.init().await {
        AuthState::Authenticated(session) => Ok(session.user),
        _ => Err(AppError::authentication(
            "Not signed in (run `portcullis login <username>`)",
        )),
    }
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}
