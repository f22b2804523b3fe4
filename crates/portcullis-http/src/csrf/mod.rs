//! CSRF token handling: cookie-backed cache, protected fetch with a single
//! refresh-and-retry, and a scoped background refresher.

pub mod manager;
pub mod refresher;

pub use manager::CsrfManager;
pub use refresher::CsrfRefresher;
