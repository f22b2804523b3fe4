//! # portcullis-auth
//!
//! Client-side session and access control.
//!
//! ## Modules
//!
//! - `jwt` — unverified JWT payload decoding for local expiry checks
//! - `token_store` — persistence of the bearer token and cached user
//! - `session` — the auth state machine (`Loading → Authenticated | Unauthenticated`)
//! - `permissions` — permission and role checks with super-admin short-circuit
//! - `guard` — protected/public route decisions
//!
//! Every check in this crate is advisory. It decides what the client shows;
//! the backend must still authorize every request on its own.

pub mod guard;
pub mod jwt;
pub mod permissions;
pub mod session;
pub mod token_store;

pub use guard::{
    GuardDecision, Location, NavigationState, ProtectedRoute, PublicRoute, Redirect, RouteGuard,
};
pub use jwt::UnverifiedClaims;
pub use permissions::{PermissionChecker, PermissionGate};
pub use session::{AuthState, SessionManager};
pub use token_store::TokenStore;

#[cfg(test)]
pub(crate) mod testing;
