//! Auth state machine and session lifecycle.

mod manager;
mod state;

pub use manager::SessionManager;
pub use state::AuthState;
