//! Domain types shared across Portcullis crates.

pub mod csrf;
pub mod id;
pub mod session;
pub mod user;

pub use csrf::CsrfToken;
pub use id::UserId;
pub use session::Session;
pub use user::{Role, User};
