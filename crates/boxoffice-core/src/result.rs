//! Convenience result type alias for Box Office.

use crate::error::AppError;

/// A specialized `Result` type for Box Office operations.
pub type AppResult<T> = Result<T, AppError>;
