//! OpenLMR Tools - command-line receiver
//!
//! `lmr-rx` feeds a 16-bit PCM WAV recording through the decoder and logs
//! every frame sync it finds.

pub mod rx;

pub use rx::{Receiver, RxConfig, RxSummary, SyncEvent};
