//! Global error handling for flatmd
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

/// Global error type for flatmd operations
#[derive(Error, Debug)]
pub enum FlattenError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Git-related errors
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regular expression errors
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// File discovery errors
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Output writer errors
    #[error("Writer error: {0}")]
    Writer(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Run aborted by the external cancellation signal
    #[error("operation cancelled")]
    Cancelled,

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Specialized Result type for flatmd operations
pub type Result<T> = std::result::Result<T, FlattenError>;

/// Creates a FlattenError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::FlattenError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// Allow converting FlattenError to io::Error for callers that only speak io
impl From<FlattenError> for io::Error {
    fn from(err: FlattenError) -> Self {
        io::Error::new(io::ErrorKind::Other, err.to_string())
    }
}
