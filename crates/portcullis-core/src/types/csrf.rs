//! CSRF token value and its cookie representation.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A server-issued CSRF token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfToken {
    /// Token value sent back in the CSRF header.
    pub value: String,
    /// When this client obtained the token.
    pub issued_at: DateTime<Utc>,
    /// Freshness window in seconds.
    pub ttl_seconds: u64,
}

impl CsrfToken {
    /// Create a token issued now.
    pub fn new(value: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            value: value.into(),
            issued_at: Utc::now(),
            ttl_seconds,
        }
    }

    /// When the token stops being fresh. Windows past chrono's range clamp
    /// to the latest representable instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| self.issued_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the token is still inside its freshness window at `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    /// Whether the token is fresh now.
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    /// Render as a `Set-Cookie` value: script-readable, `SameSite=Strict`,
    /// `Secure`, with the token's TTL as `Max-Age`.
    ///
    /// `Issued` is not a cookie attribute; it is kept so that a persisted
    /// cookie can recover its freshness window.
    pub fn to_cookie(&self, name: &str) -> String {
        format!(
            "{name}={}; Path=/; Max-Age={}; SameSite=Strict; Secure; Issued={}",
            self.value,
            self.ttl_seconds,
            self.issued_at.timestamp()
        )
    }

    /// Parse a cookie string produced by [`CsrfToken::to_cookie`].
    ///
    /// Returns `None` if the name does not match or the value is empty.
    pub fn from_cookie(name: &str, cookie: &str) -> Option<Self> {
        let mut parts = cookie.split(';').map(str::trim);
        let (key, value) = parts.next()?.split_once('=')?;
        if key != name || value.is_empty() {
            return None;
        }

        let mut ttl_seconds = 0;
        let mut issued_at = None;
        for attr in parts {
            match attr.split_once('=') {
                Some(("Max-Age", v)) => ttl_seconds = v.parse().unwrap_or(0),
                Some(("Issued", v)) => {
                    issued_at = v.parse().ok().and_then(|ts| DateTime::from_timestamp(ts, 0))
                }
                _ => {}
            }
        }

        Some(Self {
            value: value.to_string(),
            issued_at: issued_at.unwrap_or_else(Utc::now),
            ttl_seconds,
        })
    }
}
