//! Auth state machine states.

use portcullis_core::types::Session;

/// Where the client stands with respect to authentication.
///
/// `Loading` is the boot state; it resolves exactly once per boot into one
/// of the other two. Later transitions move between `Authenticated` and
/// `Unauthenticated` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The stored token has not been checked yet.
    Loading,
    /// A verified (or caller-trusted) session is active.
    Authenticated(Session),
    /// No usable session.
    Unauthenticated,
}

impl AuthState {
    /// Whether the boot check is still running.
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }

    /// Whether a session is held. Does not check expiry; use
    /// `SessionManager::is_authenticated` for that.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// The held session, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::Loading => "loading",
            AuthState::Authenticated(_) => "authenticated",
            AuthState::Unauthenticated => "unauthenticated",
        }
    }
}
