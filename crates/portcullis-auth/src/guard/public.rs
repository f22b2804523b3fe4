use portcullis_core::config::RoutesConfig;

use crate::session::SessionManager;

use super::RouteGuard;
use super::location::{GuardDecision, Location};

/// Gate for pages meant for signed-out users, such as the login page.
///
/// A signed-in user is sent to the path captured in `state.from`, or to the
/// default path when none was captured.
#[derive(Debug, Clone)]
pub struct PublicRoute {
    login_path: String,
    default_path: String,
}

impl PublicRoute {
    pub fn new(routes: &RoutesConfig) -> Self {
        Self {
            login_path: routes.login.clone(),
            default_path: routes.default.clone(),
        }
    }

    fn destination<'a>(&'a self, location: &'a Location) -> &'a str {
        match location.from() {
            // Never bounce back onto the login page itself.
            Some(from) if from != self.login_path => from,
            _ => &self.default_path,
        }
    }
}

impl RouteGuard for PublicRoute {
    fn evaluate(&self, session: &SessionManager, location: &Location) -> GuardDecision {
        if session.state().is_loading() && !session.settle_lapsed_boot() {
            return GuardDecision::Pending;
        }
        if session.is_authenticated() {
            return GuardDecision::redirect(self.destination(location), None);
        }
        GuardDecision::Render
    }
}
