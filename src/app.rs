//! Wiring of storage, transport, CSRF, API client, and session manager.

use std::sync::Arc;

use portcullis_auth::{PermissionGate, SessionManager, TokenStore};
use portcullis_core::config::AppConfig;
use portcullis_core::result::AppResult;
use portcullis_http::{ApiClient, AuthApi, CsrfManager, ReqwestTransport};

/// One fully wired client instance.
#[derive(Debug, Clone)]
pub struct App {
    pub config: AppConfig,
    pub csrf: Arc<CsrfManager>,
    pub client: Arc<ApiClient>,
    pub session: Arc<SessionManager>,
}

impl App {
    pub fn build(config: AppConfig) -> AppResult<Self> {
        let storage = portcullis_storage::open_storage(&config.session.storage)?;
        let transport = Arc::new(ReqwestTransport::new(&config.api)?);

        let csrf = Arc::new(CsrfManager::new(
            transport,
            Arc::clone(&storage),
            &config.api,
            config.csrf.clone(),
        ));
        let client = Arc::new(ApiClient::new(Arc::clone(&csrf), &config.api));
        let api = Arc::new(AuthApi::new(
            Arc::clone(&client),
            config.api.endpoints.clone(),
        ));
        let store = TokenStore::new(storage, &config.session);
        let session = Arc::new(SessionManager::new(store, api, config.session.clone()));

        tracing::debug!(
            base_url = %config.api.base_url,
            storage = %config.session.storage.backend,
            "Client wired"
        );

        Ok(Self {
            config,
            csrf,
            client,
            session,
        })
    }

    pub fn gate(&self) -> PermissionGate {
        PermissionGate::new(Arc::clone(&self.session))
    }
}
