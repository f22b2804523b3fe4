//! Persistence of the bearer token and cached user profile.

use std::sync::Arc;

use tracing::{debug, warn};

use portcullis_core::config::SessionConfig;
use portcullis_core::result::AppResult;
use portcullis_core::traits::KeyValueStorage;
use portcullis_core::types::{Session, User};

use crate::jwt::UnverifiedClaims;

/// Reads and writes the session under two fixed storage keys.
///
/// The token is stored verbatim and the user as JSON. Nothing is encrypted.
/// Several processes sharing one storage backend overwrite each other
/// (last write wins).
#[derive(Debug, Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
    token_key: String,
    user_key: String,
}

impl TokenStore {
    /// Create a store over `storage` using the configured key names.
    pub fn new(storage: Arc<dyn KeyValueStorage>, config: &SessionConfig) -> Self {
        Self {
            storage,
            token_key: config.token_key.clone(),
            user_key: config.user_key.clone(),
        }
    }

    /// The stored token, if any.
    pub fn token(&self) -> AppResult<Option<String>> {
        self.storage.get(&self.token_key)
    }

    /// The stored session, if both keys are present and the user parses.
    ///
    /// The expiry is derived from the token payload when it decodes; a
    /// token that does not decode yields `expires_at: None` and is left for
    /// the session manager to reject.
    pub fn get(&self) -> AppResult<Option<Session>> {
        let Some(token) = self.storage.get(&self.token_key)? else {
            return Ok(None);
        };
        let Some(raw_user) = self.storage.get(&self.user_key)? else {
            debug!("Token present without cached user");
            return Ok(None);
        };

        let user: User = match serde_json::from_str(&raw_user) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Cached user is unreadable, ignoring stored session");
                return Ok(None);
            }
        };

        let expires_at = UnverifiedClaims::decode(&token)
            .ok()
            .and_then(|claims| claims.expires_at());

        Ok(Some(Session {
            token,
            expires_at,
            user,
        }))
    }

    /// Write both keys.
    pub fn set(&self, session: &Session) -> AppResult<()> {
        self.storage.set(&self.token_key, &session.token)?;
        self.storage
            .set(&self.user_key, &serde_json::to_string(&session.user)?)?;
        Ok(())
    }

    /// Remove both keys.
    pub fn clear(&self) -> AppResult<()> {
        self.storage.remove(&self.token_key)?;
        self.storage.remove(&self.user_key)?;
        Ok(())
    }
}
