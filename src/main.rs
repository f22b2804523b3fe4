//! Portcullis CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod app;
mod commands;
mod output;

use commands::Cli;
use portcullis_core::config::AppConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env = std::env::var("PORTCULLIS_ENV").ok();
    let config = match AppConfig::load(&cli.config, env.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cli.execute(config).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
