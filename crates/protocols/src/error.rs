//! Error types for OpenLMR Protocols

use thiserror::Error;

/// Protocol error types
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid processor parameters: {msg}")]
    InvalidParameters { msg: String },
}

/// Result type for OpenLMR Protocols operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
