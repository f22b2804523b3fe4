//! JWT payload decoding without signature verification.
//!
//! The client never holds the signing key, so it cannot verify a token. It
//! only peeks at the payload to avoid sending a token it already knows is
//! expired. The result is **not** a security decision: a token that passes
//! here may still be rejected by the backend, which remains the sole
//! authority.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use portcullis_core::error::AppError;

/// Claims read from a token payload that has not been verified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnverifiedClaims {
    /// Subject.
    #[serde(default)]
    pub sub: Option<serde_json::Value>,
    /// Expiration (seconds since epoch). Fractional values are truncated.
    #[serde(default)]
    pub exp: Option<f64>,
    /// Issued-at (seconds since epoch).
    #[serde(default)]
    pub iat: Option<f64>,
    /// Every other claim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UnverifiedClaims {
    /// Decode the payload segment of a compact JWT.
    ///
    /// Fails with an authentication error if the token does not have three
    /// dot-separated segments or the payload is not base64url-encoded JSON
    /// object.
    pub fn decode(token: &str) -> Result<Self, AppError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments[1].is_empty() {
            return Err(AppError::authentication("Malformed token: expected three segments"));
        }

        let payload = URL_SAFE_NO_PAD
            .decode(segments[1].trim_end_matches('='))
            .map_err(|e| AppError::authentication(format!("Malformed token payload: {e}")))?;

        serde_json::from_slice(&payload)
            .map_err(|e| AppError::authentication(format!("Malformed token claims: {e}")))
    }

    /// Expiration as a timestamp, if the token carries one that chrono can
    /// represent.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp
            .and_then(|exp| DateTime::from_timestamp(exp as i64, 0))
    }

    /// Whether `exp` is at or before `now + leeway_seconds`. Tokens without
    /// `exp` never expire locally; an `exp` outside the representable range
    /// counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_seconds: i64) -> bool {
        if self.exp.is_none() {
            return false;
        }
        match self.expires_at() {
            Some(exp) => {
                let deadline = TimeDelta::try_seconds(leeway_seconds)
                    .and_then(|leeway| now.checked_add_signed(leeway))
                    .unwrap_or(now);
                deadline >= exp
            }
            None => true,
        }
    }

    /// Whether the token has expired now.
    pub fn is_expired(&self, leeway_seconds: i64) -> bool {
        self.is_expired_at(Utc::now(), leeway_seconds)
    }
}

/// Decode `token` and fail with [`ErrorKind::SessionExpired`] if it has lapsed.
///
/// Returns the expiry (if any) of a token that is still usable.
///
/// [`ErrorKind::SessionExpired`]: portcullis_core::error::ErrorKind::SessionExpired
pub fn check_expiry(token: &str, leeway_seconds: i64) -> Result<Option<DateTime<Utc>>, AppError> {
    let claims = UnverifiedClaims::decode(token)?;
    if claims.is_expired(leeway_seconds) {
        return Err(AppError::session_expired("Token has expired"));
    }
    Ok(claims.expires_at())
}
