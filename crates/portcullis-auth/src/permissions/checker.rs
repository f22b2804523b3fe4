use portcullis_core::types::User;

/// Permission checks over one user snapshot. No I/O.
///
/// A user holding the super-admin role (as primary role or as any role
/// bundle) passes every check.
#[derive(Debug, Clone, Copy)]
pub struct PermissionChecker<'a> {
    user: &'a User,
    super_admin_role: &'a str,
}

impl<'a> PermissionChecker<'a> {
    pub fn new(user: &'a User, super_admin_role: &'a str) -> Self {
        Self {
            user,
            super_admin_role,
        }
    }

    pub fn user(&self) -> &'a User {
        self.user
    }

    pub fn is_super_admin(&self) -> bool {
        !self.super_admin_role.is_empty() && self.user.holds_role(self.super_admin_role)
    }

    /// Held directly or through any role.
    pub fn has_permission(&self, code: &str) -> bool {
        self.is_super_admin() || self.user.grants(code)
    }

    /// At least one of `codes`. An empty list is never satisfied.
    pub fn has_any_permission<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        if self.is_super_admin() {
            return true;
        }
        codes.iter().any(|c| self.user.grants(c.as_ref()))
    }

    /// Every one of `codes`. An empty list is always satisfied.
    pub fn has_all_permissions<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        if self.is_super_admin() {
            return true;
        }
        codes.iter().all(|c| self.user.grants(c.as_ref()))
    }

    pub fn has_role(&self, code: &str) -> bool {
        self.is_super_admin() || self.user.holds_role(code)
    }
}
