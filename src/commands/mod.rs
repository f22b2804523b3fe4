//! CLI command definitions and dispatch.

pub mod access;
pub mod config;
pub mod csrf;
pub mod request;
pub mod session;

use clap::{Parser, Subcommand};

use crate::app::App;
use crate::output::OutputFormat;
use portcullis_core::config::AppConfig;
use portcullis_core::error::AppError;

/// Portcullis: client session and access-control toolkit
#[derive(Debug, Parser)]
#[command(name = "portcullis", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in with username and password
    Login(session::LoginArgs),
    /// Sign out and clear the stored session
    Logout,
    /// Show the session state after the boot check
    Status,
    /// Show the signed-in user, roles, and permissions
    Whoami,
    /// Check permissions for the signed-in user
    Can(access::CanArgs),
    /// Evaluate a route guard for a path
    Route(access::RouteArgs),
    /// Send an API request with session and CSRF handling
    Request(request::RequestArgs),
    /// Show or refresh the CSRF token
    Csrf(csrf::CsrfArgs),
    /// Show the effective configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        if let Commands::Config = &self.command {
            return config::execute(&config, self.format);
        }

        let app = App::build(config)?;
        match &self.command {
            Commands::Login(args) => session::login(&app, args).await,
            Commands::Logout => session::logout(&app).await,
            Commands::Status => session::status(&app, self.format).await,
            Commands::Whoami => session::whoami(&app, self.format).await,
            Commands::Can(args) => access::can(&app, args, self.format).await,
            Commands::Route(args) => access::route(&app, args, self.format).await,
            Commands::Request(args) => request::execute(&app, args, self.format).await,
            Commands::Csrf(args) => csrf::execute(&app, args, self.format).await,
            Commands::Config => Ok(()),
        }
    }
}
