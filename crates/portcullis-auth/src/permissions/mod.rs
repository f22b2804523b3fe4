//! Permission and role checks.
//!
//! [`PermissionChecker`] is a pure view over a user snapshot.
//! [`PermissionGate`] binds the same checks to a live session and adds an
//! optional remote fallback.

mod checker;
mod gate;

pub use checker::PermissionChecker;
pub use gate::PermissionGate;
