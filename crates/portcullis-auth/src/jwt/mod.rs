//! Local, unverified inspection of JWT payloads.

pub mod claims;

pub use claims::{UnverifiedClaims, check_expiry};
