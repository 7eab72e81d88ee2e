//! Error types for OpenLMR Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Buffer capacity too small: need at least {required}, got {requested}")]
    CapacityTooSmall { required: usize, requested: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for OpenLMR Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
