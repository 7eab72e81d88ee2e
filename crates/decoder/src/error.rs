//! Error types for OpenLMR Decoder

use thiserror::Error;

/// Decoder error types
#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("Core error: {0}")]
    Core(#[from] openlmr_core::CoreError),

    #[error("Sync error: {0}")]
    Sync(#[from] openlmr_sync::SyncError),
}

/// Result type for OpenLMR Decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;
