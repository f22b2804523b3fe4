//! Auth endpoint wrappers.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use portcullis_core::config::EndpointsConfig;
use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;
use portcullis_core::traits::HttpMethod;
use portcullis_core::types::User;

use crate::client::ApiClient;
use crate::envelope::{ApiEnvelope, error_message};

/// Successful credential login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// Authenticated user.
    pub user: User,
    /// Issued bearer token.
    pub access_token: String,
}

/// Calls the collaborator-owned auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: Arc<ApiClient>,
    endpoints: EndpointsConfig,
}

impl AuthApi {
    /// Create the wrapper.
    pub fn new(client: Arc<ApiClient>, endpoints: EndpointsConfig) -> Self {
        Self { client, endpoints }
    }

    /// The underlying API client.
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// `POST` credentials and return the user and token.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let request = self
            .client
            .request(HttpMethod::Post, &self.endpoints.login)
            .json(json!({ "username": username, "password": password }));

        let response = self.client.send(request).await?;
        let envelope = ApiEnvelope::from_body(&response.body);
        if !envelope.is_ok() {
            return Err(AppError::authentication(
                error_message(&response.body).unwrap_or("Login rejected"),
            ));
        }

        match (envelope.user, envelope.access_token) {
            (Some(user), Some(access_token)) => {
                info!(username = %user.username, "Login accepted");
                Ok(LoginResponse { user, access_token })
            }
            _ => Err(AppError::authentication(
                "Login response is missing user or access_token",
            )),
        }
    }

    /// Notify the backend that `token` is being discarded.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        let request = self
            .client
            .request(HttpMethod::Post, &self.endpoints.logout)
            .bearer(token);
        self.client.send(request).await?;
        Ok(())
    }

    /// Verify `token` and return the backend's current view of the user.
    ///
    /// Any failure, including a success status without a user, is an
    /// authentication error.
    pub async fn verify_token(&self, token: &str) -> AppResult<User> {
        let request = self
            .client
            .request(HttpMethod::Get, &self.endpoints.verify)
            .bearer(token);

        let response = self.client.send(request).await.map_err(|e| {
            if e.is_auth_failure() {
                e
            } else {
                AppError::authentication(format!("Token verification failed: {e}"))
            }
        })?;

        let envelope = ApiEnvelope::from_body(&response.body);
        match envelope.user {
            Some(user) if envelope.is_ok() => {
                debug!(username = %user.username, "Token verified");
                Ok(user)
            }
            _ => Err(AppError::authentication("Token verification was not confirmed")),
        }
    }

    /// Ask the backend whether the token's user holds `code`.
    pub async fn check_permission(&self, token: &str, code: &str) -> AppResult<bool> {
        let url = reqwest::Url::parse_with_params(
            &self.client.url(&self.endpoints.check_permission),
            &[("permission", code)],
        )
        .map_err(|e| AppError::configuration(format!("Invalid permission check URL: {e}")))?;

        let request = portcullis_core::traits::ApiRequest::get(url.to_string()).bearer(token);
        let response = self.client.send(request).await?;
        let envelope = ApiEnvelope::from_body(&response.body);

        Ok(envelope.is_ok() && envelope.has_permission.unwrap_or(false))
    }
}
