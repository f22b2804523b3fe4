//! Cached user profile and role bundles.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::id::UserId;

/// Immutable snapshot of the authenticated user.
///
/// Replaced wholesale on login and verification; never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Contact email, when the backend exposes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Primary role code.
    #[serde(default)]
    pub role: String,
    /// Permissions granted directly to the user.
    #[serde(default, deserialize_with = "permission_codes")]
    pub permissions: BTreeSet<String>,
    /// Role bundles, in the order the backend returned them.
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl User {
    /// Whether the user holds `code` directly or through any role.
    pub fn grants(&self, code: &str) -> bool {
        self.permissions.contains(code) || self.roles.iter().any(|r| r.permissions.contains(code))
    }

    /// Whether `code` is the primary role or the code of any role bundle.
    pub fn holds_role(&self, code: &str) -> bool {
        self.role == code || self.roles.iter().any(|r| r.code == code)
    }

    /// Every permission code the user holds, direct and inherited.
    pub fn effective_permissions(&self) -> BTreeSet<String> {
        let mut all = self.permissions.clone();
        for role in &self.roles {
            all.extend(role.permissions.iter().cloned());
        }
        all
    }
}

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Backend role id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Stable role code, e.g. `super_admin`.
    pub code: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Permission codes carried by the role.
    #[serde(default, deserialize_with = "permission_codes")]
    pub permissions: BTreeSet<String>,
}

/// Backends send permissions either as bare codes or as `{ "code": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PermissionRef {
    Code(String),
    Object { code: String },
}

fn permission_codes<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Option::<Vec<PermissionRef>>::deserialize(deserializer)?;
    Ok(refs
        .unwrap_or_default()
        .into_iter()
        .map(|r| match r {
            PermissionRef::Code(code) | PermissionRef::Object { code } => code,
        })
        .collect())
}
