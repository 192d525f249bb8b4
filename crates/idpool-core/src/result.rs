//! Convenience result type alias for IdPool.

use crate::error::AppError;

/// A specialized `Result` type for IdPool operations.
pub type AppResult<T> = Result<T, AppError>;
