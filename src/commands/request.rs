//! Ad-hoc API requests through the session and CSRF layers.

use clap::Args;

use crate::app::App;
use crate::output::{self, OutputFormat};
use portcullis_core::error::AppError;
use portcullis_core::traits::HttpMethod;

/// Arguments for `request`
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method
    pub method: HttpMethod,

    /// Path relative to the API base URL
    pub path: String,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Send without the stored bearer token
    #[arg(long)]
    pub anonymous: bool,
}

/// Send the request and print the response body
pub async fn execute(app: &App, args: &RequestArgs, format: OutputFormat) -> Result<(), AppError> {
    let mut request = app.client.request(args.method, &args.path);

    if !args.anonymous {
        app.session.init().await;
        match app.session.token() {
            Some(token) => request = request.bearer(token),
            None => output::print_warning("No active session, sending without a bearer token"),
        }
    }

    if let Some(data) = &args.data {
        let body: serde_json::Value = serde_json::from_str(data)?;
        request = request.json(body);
    }

    let response = app.client.send(request).await?;
    match format {
        OutputFormat::Json => output::print_json(&response.body),
        OutputFormat::Table => {
            output::print_kv("Status", &response.status.to_string());
            output::print_json(&response.body);
        }
    }
    Ok(())
}
