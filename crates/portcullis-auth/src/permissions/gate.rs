use std::sync::Arc;

use tracing::debug;

use portcullis_core::result::AppResult;

use crate::session::SessionManager;

use super::checker::PermissionChecker;

/// Permission checks against the live session.
///
/// Synchronous checks read the current snapshot (re-checking expiry) and
/// return `false` when nobody is signed in. [`check_permission`] can
/// additionally ask the backend about codes the snapshot does not grant.
///
/// [`check_permission`]: PermissionGate::check_permission
#[derive(Debug, Clone)]
pub struct PermissionGate {
    session: Arc<SessionManager>,
}

impl PermissionGate {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    fn with_checker(&self, f: impl FnOnce(PermissionChecker<'_>) -> bool) -> bool {
        let Some(user) = self.session.user() else {
            return false;
        };
        f(PermissionChecker::new(
            &user,
            &self.session.config().super_admin_role,
        ))
    }

    pub fn is_super_admin(&self) -> bool {
        self.with_checker(|c| c.is_super_admin())
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.with_checker(|c| c.has_permission(code))
    }

    pub fn has_any_permission<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        self.with_checker(|c| c.has_any_permission(codes))
    }

    pub fn has_all_permissions<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        self.with_checker(|c| c.has_all_permissions(codes))
    }

    pub fn has_role(&self, code: &str) -> bool {
        self.with_checker(|c| c.has_role(code))
    }

    /// Local first, then the backend when `session.remote_permission_fallback`
    /// is enabled.
    ///
    /// The remote answer is returned as is and never merged into the
    /// session snapshot; asking again queries the backend again until the
    /// session is refreshed.
    pub async fn check_permission(&self, code: &str) -> AppResult<bool> {
        self.check(code, self.session.config().remote_permission_fallback)
            .await
    }

    /// Like [`check_permission`](Self::check_permission), but asks the
    /// backend about a code the snapshot does not grant whatever
    /// `remote_permission_fallback` says.
    pub async fn check_permission_remote(&self, code: &str) -> AppResult<bool> {
        self.check(code, true).await
    }

    async fn check(&self, code: &str, remote: bool) -> AppResult<bool> {
        let Some(session) = self.session.current_session() else {
            return Ok(false);
        };
        let checker = PermissionChecker::new(&session.user, &self.session.config().super_admin_role);
        if checker.has_permission(code) {
            return Ok(true);
        }
        if !remote {
            return Ok(false);
        }

        debug!(permission = code, "Permission not in snapshot, asking backend");
        self.session.api().check_permission(&session.token, code).await
    }
}
