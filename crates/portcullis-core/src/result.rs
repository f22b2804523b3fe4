//! Convenience result type alias for Portcullis.

use crate::error::AppError;

/// A specialized `Result` type for Portcullis operations.
pub type AppResult<T> = Result<T, AppError>;
