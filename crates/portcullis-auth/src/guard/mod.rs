//! Route guards.
//!
//! A guard looks at the session and the location being visited and decides
//! whether to render, wait for the boot check, or redirect.
//!
//! These decisions are advisory. The expiry check behind them decodes the
//! JWT payload without verifying its signature, so it only spares the user
//! a round trip with a token that is known to be dead. The backend must
//! authorize every request on its own.

mod location;
mod protected;
mod public;

pub use location::{GuardDecision, Location, NavigationState, Redirect};
pub use protected::ProtectedRoute;
pub use public::PublicRoute;

use crate::session::SessionManager;

/// A navigation gate.
pub trait RouteGuard: Send + Sync {
    /// Decide what to do with a visit to `location`.
    fn evaluate(&self, session: &SessionManager, location: &Location) -> GuardDecision;
}
