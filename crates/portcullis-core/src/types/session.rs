//! Client-held session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

/// Proof of authentication held by the client: bearer token plus the cached
/// user snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Expiry derived from the token's `exp` claim; `None` if it has none.
    pub expires_at: Option<DateTime<Utc>>,
    /// Cached user profile.
    pub user: User,
}

impl Session {
    /// Whether the session has lapsed at `now`, allowing `leeway_seconds`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_seconds: i64) -> bool {
        match self.expires_at {
            Some(exp) => now + Duration::seconds(leeway_seconds) >= exp,
            None => false,
        }
    }

    /// Whether the session has lapsed now.
    pub fn is_expired(&self, leeway_seconds: i64) -> bool {
        self.is_expired_at(Utc::now(), leeway_seconds)
    }

    /// Remaining lifetime in seconds (0 if expired, `None` if unbounded).
    pub fn remaining_seconds(&self) -> Option<i64> {
        self.expires_at
            .map(|exp| (exp - Utc::now()).num_seconds().max(0))
    }
}
