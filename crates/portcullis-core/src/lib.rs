//! # portcullis-core
//!
//! Core crate for Portcullis. Contains the storage and transport traits,
//! configuration schemas, the user/session/CSRF domain types, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Portcullis crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
