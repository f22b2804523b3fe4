//! CSRF token cache and protected fetch.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use portcullis_core::config::{ApiConfig, CsrfConfig};
use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;
use portcullis_core::traits::{ApiRequest, ApiResponse, HttpTransport, KeyValueStorage};
use portcullis_core::types::CsrfToken;

use crate::client::join_url;
use crate::envelope::{ApiEnvelope, error_code};

/// Fetches, caches, and attaches the CSRF token.
///
/// The token lives in key/value storage as a cookie string so that it
/// outlives a single process, mirroring the browser cookie it models.
pub struct CsrfManager {
    /// Transport used for the token endpoint and protected requests.
    transport: Arc<dyn HttpTransport>,
    /// Where the cookie is kept.
    storage: Arc<dyn KeyValueStorage>,
    /// Absolute URL of the token endpoint.
    token_url: String,
    /// CSRF configuration.
    config: CsrfConfig,
    /// Serializes refreshes so concurrent callers share one fetch.
    refresh_lock: Mutex<()>,
    /// Number of successful fetches, used to detect a refresh that finished
    /// while a caller was waiting on `refresh_lock`.
    completed_fetches: AtomicU64,
}

impl std::fmt::Debug for CsrfManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfManager")
            .field("token_url", &self.token_url)
            .field("config", &self.config)
            .finish()
    }
}

impl CsrfManager {
    /// Create a manager for the configured token endpoint.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn KeyValueStorage>,
        api: &ApiConfig,
        config: CsrfConfig,
    ) -> Self {
        Self {
            transport,
            storage,
            token_url: join_url(&api.base_url, &api.endpoints.csrf),
            config,
            refresh_lock: Mutex::new(()),
            completed_fetches: AtomicU64::new(0),
        }
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Read the token from the cookie, fresh or not.
    ///
    /// Unreadable storage is logged and treated as "no token".
    pub fn get_token(&self) -> Option<CsrfToken> {
        match self.storage.get(&self.config.cookie_name) {
            Ok(Some(cookie)) => CsrfToken::from_cookie(&self.config.cookie_name, &cookie),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read CSRF cookie");
                None
            }
        }
    }

    /// Fetch a new token from the backend, store it, and return it.
    ///
    /// Concurrent calls are collapsed: a caller that waited while another
    /// fetch succeeded returns that token instead of fetching again. On
    /// failure the previously stored cookie is left untouched.
    pub async fn fetch_token(&self) -> AppResult<CsrfToken> {
        let seen = self.completed_fetches.load(Ordering::SeqCst);
        let _guard = self.refresh_lock.lock().await;

        if self.completed_fetches.load(Ordering::SeqCst) != seen {
            if let Some(token) = self.get_token() {
                debug!("Joined CSRF refresh completed by another caller");
                return Ok(token);
            }
        }

        let response = self
            .transport
            .send(ApiRequest::get(&self.token_url))
            .await?;

        if !response.is_success() {
            warn!(status = response.status, "CSRF token endpoint failed");
            return Err(AppError::api(
                response.status,
                format!("CSRF token endpoint returned {}", response.status),
            ));
        }

        let value = ApiEnvelope::from_body(&response.body)
            .csrf_token
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::serialization("CSRF token response has no csrf_token"))?;

        let token = CsrfToken::new(value, self.config.max_age_seconds);
        self.storage.set(
            &self.config.cookie_name,
            &token.to_cookie(&self.config.cookie_name),
        )?;
        self.completed_fetches.fetch_add(1, Ordering::SeqCst);

        info!(expires_at = %token.expires_at(), "CSRF token refreshed");
        Ok(token)
    }

    /// Return the cached token if fresh, otherwise fetch one.
    ///
    /// If the fetch fails and a (stale) token is cached, the stale token is
    /// returned unchanged rather than failing the caller.
    pub async fn ensure_token(&self) -> AppResult<CsrfToken> {
        let cached = self.get_token();
        if let Some(token) = &cached {
            if token.is_fresh() {
                return Ok(token.clone());
            }
        }

        match self.fetch_token().await {
            Ok(token) => Ok(token),
            Err(e) => match cached {
                Some(stale) => {
                    warn!(error = %e, "CSRF refresh failed, keeping previous token");
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    /// Whether a response is a CSRF-specific rejection.
    pub fn is_csrf_rejection(&self, response: &ApiResponse) -> bool {
        response.status == 403
            && error_code(&response.body).is_some_and(|code| {
                self.config
                    .rejection_codes
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(code))
            })
    }

    /// Send a request, attaching the CSRF header to mutating methods.
    ///
    /// A CSRF rejection triggers one token refresh and one retry; a second
    /// rejection is returned as [`ErrorKind::CsrfRejected`]. Non-mutating
    /// requests are sent once, unchanged. Transport failures are never
    /// retried.
    ///
    /// [`ErrorKind::CsrfRejected`]: portcullis_core::error::ErrorKind::CsrfRejected
    pub async fn protected_fetch(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        if !request.method.is_mutating() {
            return self.transport.send(request).await;
        }

        let mut first = request.clone();
        match self.ensure_token().await {
            Ok(token) => first.set_header(&self.config.header_name, token.value),
            Err(e) => warn!(error = %e, url = %request.url, "Sending without CSRF token"),
        }

        let response = self.transport.send(first).await?;
        if !self.is_csrf_rejection(&response) {
            return Ok(response);
        }

        warn!(url = %request.url, "CSRF token rejected, refreshing and retrying once");
        let token = self.fetch_token().await?;

        let mut retry = request;
        retry.set_header(&self.config.header_name, token.value);
        let response = self.transport.send(retry).await?;

        if self.is_csrf_rejection(&response) {
            return Err(AppError::csrf_rejected(format!(
                "CSRF token rejected after refresh ({} {})",
                response.status,
                error_code(&response.body).unwrap_or("unknown")
            ))
            .with_status(response.status));
        }

        Ok(response)
    }
}
