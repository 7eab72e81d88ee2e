//! Decoder configuration surface
//!
//! All knobs are plain values with clamped setters; an out-of-range request
//! is pulled back into the defined interval and logged, never rejected.

use serde::{Deserialize, Serialize};
use tracing::info;

use openlmr_sync::levels::{MINMAX_BUF_LEN, SYMBOL_BUF_LEN};
use openlmr_sync::matcher::SyncConfig;

/// Unvoiced speech quality bounds (waves per band)
pub const UV_QUALITY_MIN: u32 = 1;
pub const UV_QUALITY_MAX: u32 = 64;

/// Per-mode decode enable presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeMode {
    Dmr,
    DStar,
    Auto,
}

/// Modulation optimisation presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModulationPreset {
    Auto,
    C4fm,
    Qpsk,
    Gfsk,
}

/// P25 display toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayP25 {
    EncryptionSyncBits,
    LinkControlBits,
    StatusBitsAndLowSpeedData,
    TalkGroupInfo,
}

/// User-facing decoder options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderOptions {
    pub errorbars: bool,
    pub verbose: u32,
    pub datascope: bool,
    pub symboltiming: bool,
    pub scoperate: u32,

    pub frame_dmr: bool,
    pub frame_dstar: bool,
    pub frame_p25p1: bool,
    pub frame_x2tdma: bool,
    pub frame_nxdn48: bool,
    pub frame_nxdn96: bool,
    pub frame_provoice: bool,

    pub inverted_dmr: bool,
    pub inverted_x2tdma: bool,

    pub mod_c4fm: bool,
    pub mod_qpsk: bool,
    pub mod_gfsk: bool,
    pub mod_threshold: u32,
    pub ssize: usize,
    pub msize: usize,

    pub p25_enc: bool,
    pub p25_lc: bool,
    pub p25_status: bool,
    pub p25_tg: bool,
    pub unmute_encrypted_p25: bool,

    pub audio_gain: f32,
    pub uvquality: u32,
    pub upsample: u32,
    pub resume: u32,
    pub use_cosine_filter: bool,
    pub audio_out: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            errorbars: true,
            verbose: 2,
            datascope: false,
            symboltiming: false,
            scoperate: 15,
            frame_dmr: true,
            frame_dstar: false,
            frame_p25p1: true,
            frame_x2tdma: true,
            frame_nxdn48: false,
            frame_nxdn96: false,
            frame_provoice: false,
            inverted_dmr: false,
            inverted_x2tdma: false,
            mod_c4fm: true,
            mod_qpsk: true,
            mod_gfsk: true,
            mod_threshold: 26,
            ssize: 36,
            msize: 15,
            p25_enc: false,
            p25_lc: false,
            p25_status: false,
            p25_tg: false,
            unmute_encrypted_p25: false,
            audio_gain: 0.0,
            uvquality: 3,
            upsample: 0,
            resume: 0,
            use_cosine_filter: true,
            audio_out: true,
        }
    }
}

impl DecoderOptions {
    /// Snapshot of the fields the sync matcher consults per symbol
    pub fn sync_config(&self, samples_per_symbol: u32) -> SyncConfig {
        SyncConfig {
            frame_p25p1: self.frame_p25p1,
            frame_x2tdma: self.frame_x2tdma,
            frame_dmr: self.frame_dmr,
            frame_provoice: self.frame_provoice,
            frame_nxdn48: self.frame_nxdn48,
            frame_nxdn96: self.frame_nxdn96,
            frame_dstar: self.frame_dstar,
            inverted_dmr: self.inverted_dmr,
            inverted_x2tdma: self.inverted_x2tdma,
            mod_c4fm: self.mod_c4fm,
            mod_qpsk: self.mod_qpsk,
            mod_gfsk: self.mod_gfsk,
            mod_threshold: self.mod_threshold,
            ssize: self.ssize,
            msize: self.msize,
            samples_per_symbol,
        }
    }

    /// Set the unvoiced speech quality, clamped to [1, 64]
    pub fn set_uv_quality(&mut self, quality: i32) {
        self.uvquality = quality.clamp(UV_QUALITY_MIN as i32, UV_QUALITY_MAX as i32) as u32;
        info!(
            "Setting unvoiced speech quality to {} waves per band.",
            self.uvquality
        );
    }

    /// Set audio upsampling; anything but x6 or x7 disables it
    pub fn set_upsampling(&mut self, upsampling: i32) {
        self.upsample = if upsampling == 6 || upsampling == 7 {
            upsampling as u32
        } else {
            0
        };
        info!(
            "Setting upsampling to x{}",
            if self.upsample == 0 { 1 } else { self.upsample }
        );
    }

    /// Set the C4FM/QPSK auto-detection flip threshold
    pub fn set_auto_detection_threshold(&mut self, threshold: i32) {
        self.mod_threshold = threshold.max(0) as u32;
        info!(
            "Setting C4FM/QPSK auto detection threshold to {}",
            self.mod_threshold
        );
    }

    /// Set the QPSK symbol buffer size, clamped to [1, 128]
    pub fn set_qpsk_symbol_buffer_size(&mut self, size: i32) {
        self.ssize = size.clamp(1, SYMBOL_BUF_LEN as i32) as usize;
        info!("Setting QPSK symbol buffer to {}", self.ssize);
    }

    /// Set the QPSK min/max averaging buffer size, clamped to [1, 1024]
    pub fn set_qpsk_min_max_buffer_size(&mut self, size: i32) {
        self.msize = size.clamp(1, MINMAX_BUF_LEN as i32) as usize;
        info!("Setting QPSK Min/Max buffer to {}", self.msize);
    }
}
