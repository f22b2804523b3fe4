//! Session lifecycle manager: boot verification, login, logout, expiry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use portcullis_core::config::SessionConfig;
use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;
use portcullis_core::types::{Session, User};
use portcullis_http::AuthApi;

use crate::jwt::check_expiry;
use crate::token_store::TokenStore;

use super::state::AuthState;

/// Owns the client's auth state.
///
/// One instance per application; construct it at startup and pass it to
/// whatever needs it. State changes are published on a `watch` channel.
///
/// Every transition bumps a monotonic generation counter. Async work
/// (boot verification, refresh) captures the generation before its first
/// await and only applies its result if the counter is unchanged, so a
/// logout that lands mid-verification is never overwritten by the stale
/// verification response.
pub struct SessionManager {
    /// Session persistence.
    store: TokenStore,
    /// Auth endpoints.
    api: Arc<AuthApi>,
    /// Session configuration.
    config: SessionConfig,
    /// Current state, observable by subscribers.
    state: watch::Sender<AuthState>,
    /// Bumped on every transition.
    generation: AtomicU64,
    /// Serializes transitions (never held across an await).
    transitions: Mutex<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state.borrow().label())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("config", &self.config)
            .finish()
    }
}

impl SessionManager {
    /// Create a manager in the `Loading` state.
    pub fn new(store: TokenStore, api: Arc<AuthApi>, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            store,
            api,
            config,
            state,
            generation: AtomicU64::new(0),
            transitions: Mutex::new(()),
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Auth endpoint client.
    pub fn api(&self) -> &Arc<AuthApi> {
        &self.api
    }

    /// Current transition generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Current state, after re-checking expiry of a held session.
    pub fn state(&self) -> AuthState {
        self.current_session();
        self.state.borrow().clone()
    }

    /// Wait until the boot check has settled and return the state.
    pub async fn settled(&self) -> AuthState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| !s.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => AuthState::Unauthenticated,
        }
    }

    /// Boot check: `Loading → Authenticated | Unauthenticated`.
    ///
    /// Authenticated only if a stored token exists, decodes, has not
    /// expired, and the backend verifies it; the backend's user then
    /// replaces the cached one. Every other outcome clears the store. This
    /// never fails: problems are resolved into the resulting state.
    pub async fn init(&self) -> AuthState {
        let generation = {
            let _t = self.lock();
            self.state.send_replace(AuthState::Loading);
            self.bump()
        };

        let stored = match self.store.get() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                None
            }
        };
        let Some(stored) = stored else {
            return self.settle_unauthenticated(generation, "no stored session");
        };

        let expires_at = match check_expiry(&stored.token, self.config.expiry_leeway_seconds) {
            Ok(expires_at) => expires_at,
            Err(e) => {
                debug!(error = %e, "Stored token rejected locally");
                return self.settle_unauthenticated(generation, "stored token expired or malformed");
            }
        };

        match self.api.verify_token(&stored.token).await {
            Ok(user) => self.settle_authenticated(
                generation,
                Session {
                    token: stored.token,
                    expires_at,
                    user,
                },
            ),
            Err(e) => {
                debug!(error = %e, "Token verification failed");
                self.settle_unauthenticated(generation, "verification failed")
            }
        }
    }

    /// Adopt a session the caller already obtained. No backend call.
    ///
    /// The token gets the same local check as on boot: one that does not
    /// decode or has already expired is refused, and neither the store nor
    /// the current state is touched.
    pub fn login(&self, user: User, token: String) -> AppResult<()> {
        let expires_at = check_expiry(&token, self.config.expiry_leeway_seconds).inspect_err(|e| {
            warn!(username = %user.username, error = %e, "Refusing unusable token");
        })?;
        let session = Session {
            token,
            expires_at,
            user,
        };

        let _t = self.lock();
        self.store.set(&session)?;
        self.bump();
        info!(username = %session.user.username, expires_at = ?session.expires_at, "Session started");
        self.state.send_replace(AuthState::Authenticated(session));
        Ok(())
    }

    /// Log in with credentials against the backend, then adopt the session.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let response = self.api.login(username, password).await?;
        self.login(response.user.clone(), response.access_token)?;
        Ok(response.user)
    }

    /// End the session.
    ///
    /// The backend is notified on a best-effort basis; local state is
    /// cleared whether or not that call succeeds.
    pub async fn logout(&self) {
        let token = {
            let _t = self.lock();
            self.bump();
            self.state.borrow().session().map(|s| s.token.clone())
        };
        let token = token.or_else(|| self.store.token().ok().flatten());

        if let Some(token) = token {
            if let Err(e) = self.api.logout(&token).await {
                warn!(error = %e, "Logout notification failed, clearing local session anyway");
            }
        }

        let _t = self.lock();
        self.bump();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.state.send_replace(AuthState::Unauthenticated);
        info!("Session ended");
    }

    /// Re-verify the current token and replace the cached user.
    ///
    /// A failed verification ends the session.
    pub async fn refresh(&self) -> AppResult<User> {
        let session = self
            .current_session()
            .ok_or_else(|| AppError::authentication("No active session"))?;
        let generation = self.generation();

        match self.api.verify_token(&session.token).await {
            Ok(user) => {
                let state = self.settle_authenticated(
                    generation,
                    Session {
                        user: user.clone(),
                        ..session
                    },
                );
                if state.is_authenticated() {
                    Ok(user)
                } else {
                    Err(AppError::authentication("Session changed during refresh"))
                }
            }
            Err(e) => {
                self.settle_unauthenticated(generation, "refresh verification failed");
                Err(e)
            }
        }
    }

    /// The active session, re-checking expiry. An expired session is
    /// cleared and the state moves to `Unauthenticated`.
    pub fn current_session(&self) -> Option<Session> {
        let session = self.state.borrow().session().cloned()?;
        if session.is_expired(self.config.expiry_leeway_seconds) {
            self.expire(&session.token);
            return None;
        }
        Some(session)
    }

    /// Whether a non-expired session is held.
    ///
    /// While loading this is `false`; a stored token that is already
    /// absent, malformed, or expired settles the state immediately.
    pub fn is_authenticated(&self) -> bool {
        let loading = self.state.borrow().is_loading();
        if loading {
            self.settle_lapsed_boot();
            return false;
        }
        self.current_session().is_some()
    }

    /// The cached user of the active session.
    pub fn user(&self) -> Option<User> {
        self.current_session().map(|s| s.user)
    }

    /// The bearer token of the active session.
    pub fn token(&self) -> Option<String> {
        self.current_session().map(|s| s.token)
    }

    /// While loading, settle to `Unauthenticated` at once if the stored
    /// token cannot succeed (absent, malformed, or expired). Returns
    /// whether it settled. Any in-flight boot verification is discarded.
    pub fn settle_lapsed_boot(&self) -> bool {
        let token = match self.store.token() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        };
        let usable = token
            .as_deref()
            .is_some_and(|t| check_expiry(t, self.config.expiry_leeway_seconds).is_ok());
        if usable {
            return false;
        }

        let _t = self.lock();
        let loading = self.state.borrow().is_loading();
        if !loading {
            return false;
        }
        self.bump();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.state.send_replace(AuthState::Unauthenticated);
        info!("Stored session unusable, settled without verification");
        true
    }

    fn expire(&self, token: &str) {
        let _t = self.lock();
        let still_current = self
            .state
            .borrow()
            .session()
            .is_some_and(|s| s.token == token);
        if !still_current {
            return;
        }
        self.bump();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear expired session");
        }
        self.state.send_replace(AuthState::Unauthenticated);
        info!("Session expired");
    }

    fn settle_authenticated(&self, generation: u64, session: Session) -> AuthState {
        let _t = self.lock();
        if self.generation() != generation {
            debug!(generation, current = self.generation(), "Discarding stale verification result");
            return self.state.borrow().clone();
        }
        if let Err(e) = self.store.set(&session) {
            warn!(error = %e, "Failed to persist verified session");
        }
        info!(username = %session.user.username, "Session verified");
        let state = AuthState::Authenticated(session);
        self.state.send_replace(state.clone());
        state
    }

    fn settle_unauthenticated(&self, generation: u64, reason: &str) -> AuthState {
        let _t = self.lock();
        if self.generation() != generation {
            debug!(generation, reason, "Discarding stale verification result");
            return self.state.borrow().clone();
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        info!(reason, "Session unauthenticated");
        self.state.send_replace(AuthState::Unauthenticated);
        AuthState::Unauthenticated
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
