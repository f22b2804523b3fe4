//! # portcullis-http
//!
//! Everything that talks to the backend.
//!
//! ## Modules
//!
//! - `transport` — `reqwest`-backed [`HttpTransport`](portcullis_core::traits::HttpTransport)
//! - `envelope` — parsing of the backend's `{ status|success, ... }` response shape
//! - `csrf` — CSRF token cache, protected fetch with single retry, background refresh
//! - `client` — base-URL joining and status-to-error mapping
//! - `auth_api` — login, logout, token verification, and remote permission checks

pub mod auth_api;
pub mod client;
pub mod csrf;
pub mod envelope;
pub mod transport;

pub use auth_api::{AuthApi, LoginResponse};
pub use client::ApiClient;
pub use csrf::{CsrfManager, CsrfRefresher};
pub use envelope::ApiEnvelope;
pub use transport::ReqwestTransport;
