//! Test fixtures: unsigned JWTs, users, and a scripted backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use tokio::sync::Semaphore;

use portcullis_core::config::AppConfig;
use portcullis_core::result::AppResult;
use portcullis_core::traits::{ApiRequest, ApiResponse, HttpTransport};
use portcullis_core::types::{Role, User, UserId};
use portcullis_http::{ApiClient, AuthApi, CsrfManager};
use portcullis_storage::MemoryStorage;

use crate::session::SessionManager;
use crate::token_store::TokenStore;

/// An unsigned compact JWT with the given `exp`.
pub fn jwt(exp: Option<i64>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let mut claims = json!({"sub": "1"});
    if let Some(exp) = exp {
        claims["exp"] = json!(exp);
    }
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
    format!("{header}.{payload}.unsigned")
}

/// A JWT expiring an hour from now.
pub fn live_jwt() -> String {
    jwt(Some(chrono::Utc::now().timestamp() + 3600))
}

pub fn user(username: &str, permissions: &[&str]) -> User {
    User {
        id: UserId::Numeric(1),
        username: username.to_string(),
        email: None,
        role: "staff".to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        roles: Vec::new(),
    }
}

pub fn role(code: &str, permissions: &[&str]) -> Role {
    Role {
        id: None,
        code: code.to_string(),
        name: None,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

type Handler = Box<dyn Fn(&ApiRequest) -> AppResult<ApiResponse> + Send + Sync>;

/// Scripted backend. Requests to `/auth/verify-token` can be held until
/// [`Backend::release_verify`] is called.
pub struct Backend {
    handler: Handler,
    sent: Mutex<Vec<ApiRequest>>,
    verify_gate: Option<Arc<Semaphore>>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish()
    }
}

impl Backend {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> AppResult<ApiResponse> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            sent: Mutex::new(Vec::new()),
            verify_gate: None,
        }
    }

    /// Backend that verifies every token as `user`.
    pub fn verifying(user: User) -> Self {
        Self::new(move |req| {
            if req.url.ends_with("/csrf-token") {
                Ok(ApiResponse::new(200, json!({"csrf_token": "csrf"})))
            } else {
                Ok(ApiResponse::new(200, json!({"status": "success", "user": user})))
            }
        })
    }

    pub fn hold_verify(mut self) -> Self {
        self.verify_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn release_verify(&self) {
        if let Some(gate) = &self.verify_gate {
            gate.add_permits(1);
        }
    }

    pub fn count_to(&self, suffix: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(suffix))
            .count()
    }
}

#[async_trait]
impl HttpTransport for Backend {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        self.sent.lock().unwrap().push(request.clone());
        if request.url.ends_with("/auth/verify-token") {
            if let Some(gate) = &self.verify_gate {
                gate.acquire().await.unwrap().forget();
            }
        }
        (self.handler)(&request)
    }
}

/// Wire a session manager over in-memory storage and `backend`.
pub fn manager_with(
    backend: Arc<Backend>,
    config: &AppConfig,
) -> (Arc<SessionManager>, MemoryStorage) {
    let storage = MemoryStorage::new();
    let shared: Arc<dyn portcullis_core::traits::KeyValueStorage> = Arc::new(storage.clone());
    let csrf = Arc::new(CsrfManager::new(
        backend,
        Arc::new(MemoryStorage::new()),
        &config.api,
        config.csrf.clone(),
    ));
    let client = Arc::new(ApiClient::new(csrf, &config.api));
    let api = Arc::new(AuthApi::new(client, config.api.endpoints.clone()));
    let store = TokenStore::new(shared, &config.session);
    (
        Arc::new(SessionManager::new(store, api, config.session.clone())),
        storage,
    )
}

pub fn manager(backend: Arc<Backend>) -> (Arc<SessionManager>, MemoryStorage) {
    manager_with(backend, &AppConfig::default())
}
