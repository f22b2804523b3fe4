//! API client: URL joining, CSRF routing, and status-to-error mapping.

use std::sync::Arc;

use tracing::debug;

use portcullis_core::config::ApiConfig;
use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;
use portcullis_core::traits::{ApiRequest, ApiResponse, HttpMethod};

use crate::csrf::CsrfManager;
use crate::envelope::error_message;

/// Join a base URL and a path with exactly one slash. Absolute `http(s)`
/// paths are returned unchanged.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Client for the backend API.
///
/// Every request goes through [`CsrfManager::protected_fetch`], which
/// passes safe methods through untouched.
#[derive(Debug, Clone)]
pub struct ApiClient {
    csrf: Arc<CsrfManager>,
    base_url: String,
}

impl ApiClient {
    /// Create a client rooted at the configured base URL.
    pub fn new(csrf: Arc<CsrfManager>, config: &ApiConfig) -> Self {
        Self {
            csrf,
            base_url: config.base_url.clone(),
        }
    }

    /// The CSRF manager requests are routed through.
    pub fn csrf(&self) -> &Arc<CsrfManager> {
        &self.csrf
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Build a request for `path`.
    pub fn request(&self, method: HttpMethod, path: &str) -> ApiRequest {
        ApiRequest::new(method, self.url(path))
    }

    /// Send and return the response whatever its status.
    pub async fn execute(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        self.csrf.protected_fetch(request).await
    }

    /// Send and fail on non-2xx statuses.
    pub async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.execute(request).await?;
        debug!(%method, %url, status = response.status, "API call finished");
        error_for_status(response)
    }
}

/// Map a non-2xx response to an error: 401 → Authentication,
/// 403 → Authorization, anything else → Api.
pub fn error_for_status(response: ApiResponse) -> AppResult<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let message = error_message(&response.body)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", response.status));

    let err = match response.status {
        401 => AppError::authentication(message),
        403 => AppError::authorization(message),
        _ => AppError::api(response.status, message),
    };
    Err(err.with_status(response.status))
}
