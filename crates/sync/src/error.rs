//! Error types for OpenLMR Sync

use thiserror::Error;

/// Sync error types
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Unknown sync code: {code}")]
    UnknownSyncCode { code: i32 },

    #[error("Core error: {0}")]
    Core(#[from] openlmr_core::CoreError),
}

/// Result type for OpenLMR Sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
