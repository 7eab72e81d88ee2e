//! OpenLMR Decoder - sample pump, sync FSM, and frame dispatch
//!
//! [`decoder::Decoder`] is the top of the stack: it consumes one 16-bit PCM
//! sample per [`decoder::Decoder::run`] call, recovers symbols through the
//! slicer, searches for frame sync with the matcher, and dispatches locked
//! frames to the per-protocol processors.

pub mod datascope;
pub mod decoder;
pub mod error;
pub mod options;
pub mod state;
pub mod symbol;

pub use error::{DecoderError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        datascope::Datascope,
        decoder::{Decoder, FsmState},
        error::{DecoderError, Result},
        options::{DecodeMode, DecoderOptions, DisplayP25, ModulationPreset},
        state::AudioLevels,
        symbol::SymbolSlicer,
    };
}
