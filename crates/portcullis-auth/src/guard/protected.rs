use tracing::debug;

use portcullis_core::config::RoutesConfig;

use crate::permissions::PermissionChecker;
use crate::session::SessionManager;

use super::RouteGuard;
use super::location::{GuardDecision, Location};

/// Gate for pages that need a signed-in user, optionally with permissions
/// or a role.
///
/// - not signed in: redirect to the login path, remembering where the user
///   was headed
/// - missing any required permission, or the required role: redirect to
///   the forbidden path
/// - otherwise render
#[derive(Debug, Clone)]
pub struct ProtectedRoute {
    permissions: Vec<String>,
    required_role: Option<String>,
    login_path: String,
    forbidden_path: String,
}

impl ProtectedRoute {
    pub fn new(routes: &RoutesConfig) -> Self {
        Self {
            permissions: Vec::new(),
            required_role: None,
            login_path: routes.login.clone(),
            forbidden_path: routes.forbidden.clone(),
        }
    }

    /// Require every one of `codes`.
    pub fn permissions<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn required_role(mut self, role: impl Into<String>) -> Self {
        self.required_role = Some(role.into());
        self
    }
}

impl RouteGuard for ProtectedRoute {
    fn evaluate(&self, session: &SessionManager, location: &Location) -> GuardDecision {
        if session.state().is_loading() {
            if session.settle_lapsed_boot() {
                debug!(path = %location.path, "Stored session unusable, redirecting to login");
                return GuardDecision::redirect(&self.login_path, Some(&location.path));
            }
            return GuardDecision::Pending;
        }

        let Some(user) = session.user() else {
            debug!(path = %location.path, "Not signed in, redirecting to login");
            return GuardDecision::redirect(&self.login_path, Some(&location.path));
        };

        let checker = PermissionChecker::new(&user, &session.config().super_admin_role);
        if !self.permissions.is_empty() && !checker.has_all_permissions(self.permissions.as_slice()) {
            debug!(
                path = %location.path,
                username = %user.username,
                required = ?self.permissions,
                "Missing permission"
            );
            return GuardDecision::redirect(&self.forbidden_path, None);
        }

        if let Some(role) = &self.required_role {
            if !checker.has_role(role) {
                debug!(path = %location.path, username = %user.username, role = %role, "Missing role");
                return GuardDecision::redirect(&self.forbidden_path, None);
            }
        }

        GuardDecision::Render
    }
}
