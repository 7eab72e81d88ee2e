//! OpenLMR Sync - frame synchronisation search
//!
//! This crate holds the sync pattern constants for the supported narrow-band
//! protocols (P25 Phase 1, X2-TDMA, DMR, D-STAR, NXDN, ProVoice), the
//! per-symbol multi-pattern matcher, the adaptive symbol level tracker, and
//! the C4FM/QPSK/GFSK modulation auto-selector.

pub mod error;
pub mod levels;
pub mod matcher;
pub mod modulation;
pub mod patterns;

pub use error::{Result, SyncError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        error::{Result, SyncError},
        levels::LevelTracker,
        matcher::{SearchStep, SyncConfig, SyncHit, SyncMatcher},
        modulation::Modulation,
        patterns::{FrameKind, FrameSubtype, FrameType, Polarity, SyncFamily, SyncId},
    };
}
