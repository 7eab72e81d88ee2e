//! Top-level decoder: sample pump, sync FSM, frame dispatch

use tracing::{debug, info, trace};

use openlmr_core::buffer::{Dibit, DibitHistory};
use openlmr_protocols::common::{FrameContext, FrameEvent, FrameInfo, FrameProcessor};
use openlmr_protocols::dmr::{DmrDataProcessor, DmrVoiceProcessor};
use openlmr_protocols::dstar::{DstarHdProcessor, DstarProcessor};
use openlmr_sync::levels::LevelTracker;
use openlmr_sync::matcher::{SearchStep, SyncHit, SyncMatcher};
use openlmr_sync::modulation::Modulation;
use openlmr_sync::patterns::{FrameKind, FrameSubtype, FrameType, Polarity, SyncFamily, SyncId};

use crate::datascope::{Datascope, SCOPE_SYMBOL_RATE};
use crate::error::Result;
use crate::options::{DecodeMode, DecoderOptions, DisplayP25, ModulationPreset};
use crate::state::AudioLevels;
use crate::symbol::SymbolSlicer;

/// Divisor turning the tracked maximum into an input level percentage
pub const INPUT_LEVEL_DIVISOR: i32 = 164;

/// Decoder FSM states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FsmState {
    #[default]
    LookForSync,
    SyncFound,
    ProcessDmrVoice,
    ProcessDmrData,
    ProcessDstar,
    ProcessDstarHd,
}

/// Sample-driven sync-search and dispatch engine.
///
/// Feed samples in acquisition order through [`Decoder::run`]; the decoder
/// is strictly synchronous and must not be shared between threads without
/// external serialisation. Dropping it is the only cleanup.
pub struct Decoder {
    opts: DecoderOptions,
    fsm: FsmState,
    has_sync: bool,
    pending_sync: i32,
    synctype: i32,
    slicer: SymbolSlicer,
    matcher: SyncMatcher,
    levels: LevelTracker,
    dibits: DibitHistory,
    info: FrameInfo,
    audio: AudioLevels,
    scope: Datascope,
    dmr_voice: DmrVoiceProcessor,
    dmr_data: DmrDataProcessor,
    dstar: DstarProcessor,
    dstar_hd: DstarHdProcessor,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    pub fn with_options(opts: DecoderOptions) -> Self {
        let mut decoder = Self {
            opts,
            fsm: FsmState::LookForSync,
            has_sync: false,
            pending_sync: -2,
            synctype: -1,
            slicer: SymbolSlicer::new(),
            matcher: SyncMatcher::new(),
            levels: LevelTracker::new(),
            dibits: DibitHistory::new(),
            info: FrameInfo::new(),
            audio: AudioLevels::new(),
            scope: Datascope::new(),
            dmr_voice: DmrVoiceProcessor::new(),
            dmr_data: DmrDataProcessor::new(),
            dstar: DstarProcessor::new(),
            dstar_hd: DstarHdProcessor::new(),
        };

        decoder.reset_frame_sync();
        decoder.no_carrier();
        decoder
    }

    /// Decoder with a reduced dibit history for memory-constrained hosts
    pub fn with_history_capacity(opts: DecoderOptions, capacity: usize) -> Result<Self> {
        let mut decoder = Self::with_options(opts);
        decoder.dibits = DibitHistory::with_capacity(capacity)?;
        Ok(decoder)
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.opts
    }

    pub fn fsm_state(&self) -> FsmState {
        self.fsm
    }

    pub fn has_sync(&self) -> bool {
        self.has_sync
    }

    pub fn carrier(&self) -> bool {
        self.matcher.carrier()
    }

    /// Sync code of the frame currently being processed
    pub fn sync_code(&self) -> i32 {
        self.synctype
    }

    /// Most recent confirmed sync code, -1 when none
    pub fn last_sync_code(&self) -> i32 {
        self.matcher.last_sync_code()
    }

    /// Search position of the last sync hit
    pub fn sync_offset(&self) -> u32 {
        self.matcher.offset()
    }

    pub fn first_frame(&self) -> bool {
        self.matcher.first_frame()
    }

    pub fn modulation(&self) -> Modulation {
        self.matcher.modulation()
    }

    pub fn levels(&self) -> &LevelTracker {
        &self.levels
    }

    pub fn frame_info(&self) -> &FrameInfo {
        &self.info
    }

    pub fn samples_per_symbol(&self) -> u32 {
        self.slicer.samples_per_symbol()
    }

    /// Feed one PCM sample.
    ///
    /// Returns after the slicer absorbs the sample; when a symbol is emitted
    /// the FSM advances by exactly one step.
    pub fn run(&mut self, sample: i16) {
        if !self.slicer.push_sample(sample, self.has_sync) {
            return;
        }

        let symbol = self.slicer.symbol();
        self.dibits.push(Dibit::from_symbol(symbol));

        match self.fsm {
            FsmState::LookForSync => self.look_for_sync(symbol),
            FsmState::SyncFound => {
                self.synctype = self.pending_sync;
                if self.synctype > -1 {
                    trace!(
                        symbol = self.slicer.symbol_count(),
                        value = symbol,
                        "initialising frame processing"
                    );
                    self.process_frame_init(symbol);
                } else {
                    self.no_carrier();
                    self.reset_frame_sync();
                }
            }
            FsmState::ProcessDmrVoice => {
                let mut ctx = FrameContext {
                    symbol,
                    dibit: Dibit::from_symbol(symbol),
                    info: &mut self.info,
                };
                if self.dmr_voice.process(&mut ctx) == FrameEvent::Complete {
                    self.reset_frame_sync();
                }
            }
            FsmState::ProcessDmrData => {
                let mut ctx = FrameContext {
                    symbol,
                    dibit: Dibit::from_symbol(symbol),
                    info: &mut self.info,
                };
                if self.dmr_data.process(&mut ctx) == FrameEvent::Complete {
                    self.reset_frame_sync();
                }
            }
            FsmState::ProcessDstar => {
                let mut ctx = FrameContext {
                    symbol,
                    dibit: Dibit::from_symbol(symbol),
                    info: &mut self.info,
                };
                if self.dstar.process(&mut ctx) == FrameEvent::Complete {
                    self.reset_frame_sync();
                }
            }
            FsmState::ProcessDstarHd => {
                let mut ctx = FrameContext {
                    symbol,
                    dibit: Dibit::from_symbol(symbol),
                    info: &mut self.info,
                };
                if self.dstar_hd.process(&mut ctx) == FrameEvent::Complete {
                    self.reset_frame_sync();
                }
            }
        }
    }

    fn look_for_sync(&mut self, symbol: i32) {
        self.matcher.accumulate_flips(self.slicer.take_flips());
        let cfg = self.opts.sync_config(self.slicer.samples_per_symbol());
        let step = self.matcher.advance(symbol, &cfg, &mut self.levels);
        self.update_datascope();

        match step {
            SearchStep::Pending { carrier_dropped } => {
                if carrier_dropped {
                    self.no_carrier();
                }
            }
            SearchStep::Miss => {
                if self.opts.errorbars && self.opts.verbose > 1 && self.matcher.carrier() {
                    debug!("Sync: no sync");
                }
                self.no_carrier();
                self.pending_sync = -1;
                self.resolve_search(symbol);
            }
            SearchStep::Hit(hit) => {
                self.pending_sync = hit.id.code();
                self.info.frame_type = hit.frame_type;
                self.announce_sync(&hit);
                self.resolve_search(symbol);
            }
        }
    }

    /// The search produced a decision this symbol; recalibrate the slicing
    /// thresholds and move the FSM
    fn resolve_search(&mut self, symbol: i32) {
        debug!(
            sync = self.pending_sync,
            symbol = self.slicer.symbol_count(),
            value = symbol,
            "sync search resolved"
        );

        self.levels.recalibrate();

        if self.pending_sync > -1 {
            self.has_sync = true;
            self.fsm = FsmState::SyncFound;
        } else {
            self.reset_frame_sync();
        }
    }

    /// Seed per-frame state for the locked sync and hand the current symbol
    /// to the matching processor
    fn process_frame_init(&mut self, symbol: i32) {
        if self.matcher.modulation() == Modulation::Qpsk {
            self.levels.scale_refs_qpsk();
        } else {
            self.levels.pin_refs();
        }

        let id = match SyncId::from_code(self.synctype) {
            Ok(id) => id,
            Err(_) => {
                self.no_carrier();
                self.reset_frame_sync();
                return;
            }
        };

        let dibit = Dibit::from_symbol(symbol);

        match (id.family, id.kind) {
            (SyncFamily::Dmr, FrameKind::Voice) => {
                self.info.clear_call();
                self.print_input_level();
                self.info.frame_subtype = FrameSubtype::Voice;
                self.dmr_voice.init(&mut self.info);
                let mut ctx = FrameContext {
                    symbol,
                    dibit,
                    info: &mut self.info,
                };
                self.dmr_voice.process(&mut ctx);
                self.fsm = FsmState::ProcessDmrVoice;
            }
            (SyncFamily::Dmr, FrameKind::Data) => {
                self.info.clear_call();
                self.print_input_level();
                self.info.frame_subtype = FrameSubtype::Data;
                self.info.err_str.clear();
                self.dmr_data.init(&mut self.info);
                let mut ctx = FrameContext {
                    symbol,
                    dibit,
                    info: &mut self.info,
                };
                self.dmr_data.process(&mut ctx);
                self.fsm = FsmState::ProcessDmrData;
            }
            (SyncFamily::DStar, _) => {
                self.info.clear_call();
                self.print_input_level();
                self.info.frame_subtype = FrameSubtype::Voice;
                self.dstar.init(&mut self.info);
                let mut ctx = FrameContext {
                    symbol,
                    dibit,
                    info: &mut self.info,
                };
                self.dstar.process(&mut ctx);
                self.fsm = FsmState::ProcessDstar;
            }
            (SyncFamily::DStarHd, _) => {
                self.info.clear_call();
                self.print_input_level();
                self.info.frame_subtype = FrameSubtype::Data;
                self.dstar_hd.init(&mut self.info);
                let mut ctx = FrameContext {
                    symbol,
                    dibit,
                    info: &mut self.info,
                };
                self.dstar_hd.process(&mut ctx);
                self.fsm = FsmState::ProcessDstarHd;
            }
            _ => {
                // no processor for this family; drop carrier and resume the
                // search on the next symbol
                self.no_carrier();
                self.reset_frame_sync();
            }
        }
    }

    /// Clear the sync-search working set; carrier and level history stay
    pub fn reset_frame_sync(&mut self) {
        trace!(
            symbol = self.slicer.symbol_count(),
            value = self.slicer.symbol(),
            "reset frame sync"
        );

        self.matcher.reset_search();
        self.pending_sync = -2;
        self.has_sync = false;

        if self.opts.symboltiming && self.matcher.carrier() {
            debug!("Symbol Timing:");
        }

        self.fsm = FsmState::LookForSync;
    }

    /// Full carrier-loss reset: levels re-seed, sync context and the frame
    /// panel clear, audio gain restarts
    pub fn no_carrier(&mut self) {
        self.dibits.reset();
        self.slicer.carrier_lost();
        self.matcher.drop_carrier();
        self.levels.carrier_lost();
        self.info.clear();
        self.audio.carrier_lost(self.opts.audio_gain);
    }

    fn print_input_level(&self) {
        if self.opts.errorbars && self.opts.verbose > 0 {
            debug!("inlvl: {:2}% ", self.levels.max() / INPUT_LEVEL_DIVISOR);
        }
    }

    fn announce_sync(&self, hit: &SyncHit) {
        if !self.opts.errorbars || self.opts.verbose == 0 {
            return;
        }

        let mut line = format!("Sync: {} ", sync_tag(hit));
        if self.opts.verbose > 2 {
            line.push_str(&format!("o: {:4} ", hit.offset + 1));
        }
        if self.opts.verbose > 1 {
            line.push_str(&format!("mod: {} ", self.matcher.modulation().as_str()));
        }
        if self.opts.verbose > 2 {
            line.push_str(&format!("g: {} ", self.audio.gain()));
        }
        info!("{}", line.trim_end());
    }

    fn update_datascope(&mut self) {
        if !self.opts.datascope || !self.matcher.primed() || self.matcher.level_index() != 0 {
            return;
        }

        self.scope.update(self.matcher.sorted_window());

        if self.slicer.symbol_count() > SCOPE_SYMBOL_RATE / self.opts.scoperate.max(1) {
            self.slicer.reset_symbol_count();
            let plot = self.scope.render(
                self.matcher.modulation().as_str(),
                &self.info,
                self.levels.min(),
                self.levels.max(),
                self.levels.center(),
            );
            info!(target: "datascope", "\n{}", plot);
        }
    }

    // --- configuration surface -------------------------------------------

    /// Silence the sync announcements
    pub fn set_quiet(&mut self) {
        self.opts.errorbars = false;
        self.opts.verbose = 0;
    }

    pub fn set_verbosity(&mut self, verbosity: u32) {
        self.opts.verbose = verbosity;
        info!("Setting verbosity to {}", verbosity);
    }

    /// Switch the diagnostics to the datascope view
    pub fn show_datascope(&mut self) {
        self.opts.errorbars = false;
        self.opts.p25_enc = false;
        self.opts.p25_lc = false;
        self.opts.p25_status = false;
        self.opts.p25_tg = false;
        self.opts.datascope = true;
        self.opts.symboltiming = false;
    }

    pub fn set_datascope_frame_rate(&mut self, frame_rate: u32) {
        self.show_datascope();
        self.opts.scoperate = frame_rate.max(1);
        info!(
            "Setting datascope frame rate to {} frame per second.",
            self.opts.scoperate
        );
    }

    pub fn show_error_bars(&mut self) {
        self.opts.errorbars = true;
        self.opts.datascope = false;
    }

    pub fn show_symbol_timing(&mut self) {
        self.opts.symboltiming = true;
        self.opts.errorbars = true;
        self.opts.datascope = false;
    }

    pub fn set_p25_display_options(&mut self, mode: DisplayP25, on: bool) {
        match mode {
            DisplayP25::EncryptionSyncBits => self.opts.p25_enc = on,
            DisplayP25::LinkControlBits => self.opts.p25_lc = on,
            DisplayP25::StatusBitsAndLowSpeedData => self.opts.p25_status = on,
            DisplayP25::TalkGroupInfo => self.opts.p25_tg = on,
        }
    }

    pub fn mute_encrypted_p25(&mut self, on: bool) {
        self.opts.unmute_encrypted_p25 = !on;
    }

    pub fn set_decode_mode(&mut self, mode: DecodeMode, on: bool) {
        let verb = if on { "Enabling" } else { "Disabling" };
        match mode {
            DecodeMode::Dmr => {
                self.opts.frame_dmr = on;
                info!("{} the decoding of DMR/MOTOTRBO frames.", verb);
            }
            DecodeMode::DStar => {
                self.opts.frame_dstar = on;
                info!("{} the decoding of D-Star frames.", verb);
            }
            DecodeMode::Auto => {
                self.opts.frame_dstar = on;
                self.opts.frame_x2tdma = on;
                self.opts.frame_p25p1 = on;
                self.opts.frame_nxdn48 = on;
                self.opts.frame_nxdn96 = on;
                self.opts.frame_dmr = on;
                self.opts.frame_provoice = on;
                info!("{} auto frame decoding.", verb);
            }
        }
    }

    pub fn set_modulation_optimizations(&mut self, preset: ModulationPreset) {
        match preset {
            ModulationPreset::Auto => {
                self.opts.mod_c4fm = true;
                self.opts.mod_qpsk = true;
                self.opts.mod_gfsk = true;
                self.matcher.set_modulation(Modulation::C4fm);
                info!("Enabling Auto modulation optimizations.");
            }
            ModulationPreset::Gfsk => {
                self.opts.mod_c4fm = false;
                self.opts.mod_qpsk = false;
                self.opts.mod_gfsk = true;
                self.matcher.set_modulation(Modulation::Gfsk);
                info!("Enabling only GFSK modulation optimizations.");
            }
            ModulationPreset::Qpsk => {
                self.opts.mod_c4fm = false;
                self.opts.mod_qpsk = true;
                self.opts.mod_gfsk = false;
                self.matcher.set_modulation(Modulation::Qpsk);
                info!("Enabling only QPSK modulation optimizations.");
            }
            ModulationPreset::C4fm => {
                self.opts.mod_c4fm = true;
                self.opts.mod_qpsk = false;
                self.opts.mod_gfsk = false;
                self.matcher.set_modulation(Modulation::C4fm);
                info!("Enabling only C4FM modulation optimizations.");
            }
        }
    }

    /// Audio gain: negative disables the setting, 0 enables auto-gain, a
    /// positive value is applied as-is
    pub fn set_audio_gain(&mut self, gain: f32) {
        self.opts.audio_gain = gain;

        if gain < 0.0 {
            info!("Disabling audio out gain setting");
        } else if gain == 0.0 {
            info!("Enabling audio out auto-gain");
        } else {
            info!("Setting audio out gain to {}", gain);
            self.audio.set_gain(gain);
        }
    }

    pub fn set_uv_quality(&mut self, quality: i32) {
        self.opts.set_uv_quality(quality);
    }

    pub fn set_upsampling(&mut self, upsampling: i32) {
        self.opts.set_upsampling(upsampling);
    }

    pub fn set_inverted_dmr(&mut self, on: bool) {
        self.opts.inverted_dmr = on;
        info!(
            "Expecting {}inverted DMR/MOTOTRBO signals.",
            if on { "" } else { "non-" }
        );
    }

    pub fn set_inverted_x2tdma(&mut self, on: bool) {
        self.opts.inverted_x2tdma = on;
        info!(
            "Expecting {}inverted X2-TDMA signals.",
            if on { "" } else { "non-" }
        );
    }

    pub fn set_auto_detection_threshold(&mut self, threshold: i32) {
        self.opts.set_auto_detection_threshold(threshold);
    }

    pub fn set_qpsk_symbol_buffer_size(&mut self, size: i32) {
        self.opts.set_qpsk_symbol_buffer_size(size);
    }

    pub fn set_qpsk_min_max_buffer_size(&mut self, size: i32) {
        self.opts.set_qpsk_min_max_buffer_size(size);
    }

    pub fn enable_cosine_filtering(&mut self, on: bool) {
        self.opts.use_cosine_filter = on;
        info!("{} cosine filter.", if on { "Enabling" } else { "Disabling" });
    }

    pub fn enable_audio_out(&mut self, on: bool) {
        self.opts.audio_out = on;
        info!(
            "{} audio output to soundcard.",
            if on { "Enabling" } else { "Disabling" }
        );
    }

    pub fn enable_scan_resume_after_tdulc_frames(&mut self, frames: u32) {
        self.opts.resume = frames;
        info!("Enabling scan resume after {} TDULC frames", frames);
    }

    pub fn set_samples_per_symbol(&mut self, samples_per_symbol: u32) {
        self.slicer.set_samples_per_symbol(samples_per_symbol);
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Announcement tag for a sync hit
fn sync_tag(hit: &SyncHit) -> &'static str {
    let inverted = hit.id.polarity == Polarity::Inverted;

    match hit.frame_type {
        FrameType::P25Phase1 => {
            if inverted {
                " -P25p1    "
            } else {
                " +P25p1    "
            }
        }
        FrameType::P25Phase1Resumed => {
            if inverted {
                "(-P25p1)   "
            } else {
                "(+P25p1)   "
            }
        }
        FrameType::X2Tdma => {
            if inverted {
                " -X2-TDMA  "
            } else {
                " +X2-TDMA  "
            }
        }
        FrameType::X2TdmaResumed => {
            if inverted {
                "(-X2-TDMA) "
            } else {
                "(+X2-TDMA) "
            }
        }
        FrameType::Dmr => match (inverted, hit.id.kind) {
            (false, FrameKind::Data) => " +DMRd     ",
            (false, FrameKind::Voice) => " +DMRv     ",
            (true, FrameKind::Voice) => " -DMRv     ",
            (true, FrameKind::Data) => " -DMRd     ",
        },
        FrameType::DmrResumed => {
            if inverted {
                "(-DMR)     "
            } else {
                "(+DMR)     "
            }
        }
        FrameType::DStar => {
            if inverted {
                " -D-STAR   "
            } else {
                " +D-STAR   "
            }
        }
        FrameType::DStarHd => {
            if inverted {
                " -D-STAR_HD   "
            } else {
                " +D-STAR_HD   "
            }
        }
        FrameType::Nxdn48 => {
            if inverted {
                " -NXDN48   "
            } else {
                " +NXDN48   "
            }
        }
        FrameType::Nxdn96 => {
            if inverted {
                " -NXDN96   "
            } else {
                " +NXDN96   "
            }
        }
        FrameType::ProVoice => {
            if inverted {
                " -ProVoice "
            } else {
                " +ProVoice "
            }
        }
        FrameType::Cleared => "           ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openlmr_protocols::dmr::{
        DMR_BURST_DIBITS, DMR_PAYLOAD_HALF_DIBITS, DMR_SUPERFRAME_BURSTS,
    };
    use openlmr_sync::patterns::*;

    const HIGH: i16 = 3_000;

    /// Feed a dibit-character sequence as PCM at 10 samples per symbol
    fn feed_symbols(decoder: &mut Decoder, chars: &[u8]) {
        for &ch in chars {
            let level = if ch == b'1' { HIGH } else { -HIGH };
            for _ in 0..10 {
                decoder.run(level);
            }
        }
    }

    /// Alternating filler that matches no sync pattern
    fn filler(len: usize) -> Vec<u8> {
        (0..len).map(|i| if i % 2 == 0 { b'1' } else { b'3' }).collect()
    }

    fn quiet_decoder() -> Decoder {
        let mut decoder = Decoder::new();
        decoder.set_quiet();
        decoder
    }

    #[test]
    fn test_cold_start_no_signal() {
        let mut decoder = quiet_decoder();

        // over 1800 symbols of dead air
        for _ in 0..18_100 {
            decoder.run(0);
        }

        assert_eq!(decoder.fsm_state(), FsmState::LookForSync);
        assert!(!decoder.has_sync());
        assert!(!decoder.carrier());
        assert_eq!(decoder.last_sync_code(), -1);
        assert_eq!(decoder.levels().min(), -15_000);
        assert_eq!(decoder.levels().max(), 15_000);
        assert_eq!(decoder.levels().center(), 0);
    }

    #[test]
    fn test_dmr_voice_lock() {
        let mut decoder = quiet_decoder();

        let mut stream = filler(24);
        stream.extend_from_slice(DMR_BS_VOICE_SYNC);
        feed_symbols(&mut decoder, &stream);

        // the pattern-completing symbol resolves the search
        assert_eq!(decoder.fsm_state(), FsmState::SyncFound);
        assert!(decoder.has_sync());
        assert!(decoder.carrier());
        assert_eq!(decoder.last_sync_code(), 12);
        assert!(decoder.first_frame());
        assert_eq!(decoder.frame_info().frame_type.label(), " DMR         ");

        // the next symbol dispatches the frame
        feed_symbols(&mut decoder, &filler(1));
        assert_eq!(decoder.fsm_state(), FsmState::ProcessDmrVoice);
        assert_eq!(decoder.sync_code(), 12);
        assert_eq!(decoder.frame_info().frame_subtype.label(), " VOICE        ");
    }

    #[test]
    fn test_dmr_voice_superframe_returns_to_search() {
        let mut decoder = quiet_decoder();

        let mut stream = filler(24);
        stream.extend_from_slice(DMR_BS_VOICE_SYNC);
        feed_symbols(&mut decoder, &stream);

        let superframe =
            DMR_PAYLOAD_HALF_DIBITS + (DMR_SUPERFRAME_BURSTS - 1) * DMR_BURST_DIBITS;
        feed_symbols(&mut decoder, &filler(superframe + 1));

        assert_eq!(decoder.fsm_state(), FsmState::LookForSync);
        assert!(!decoder.has_sync());
        // a completed frame is not a carrier loss
        assert!(decoder.carrier());
        assert_eq!(decoder.last_sync_code(), 12);
    }

    #[test]
    fn test_dmr_data_dispatch() {
        let mut decoder = quiet_decoder();

        let mut stream = filler(24);
        stream.extend_from_slice(DMR_MS_DATA_SYNC);
        feed_symbols(&mut decoder, &stream);
        assert_eq!(decoder.last_sync_code(), 10);

        feed_symbols(&mut decoder, &filler(1));
        assert_eq!(decoder.fsm_state(), FsmState::ProcessDmrData);
        assert_eq!(decoder.frame_info().frame_subtype.label(), " DATA         ");

        feed_symbols(&mut decoder, &filler(DMR_PAYLOAD_HALF_DIBITS));
        assert_eq!(decoder.fsm_state(), FsmState::LookForSync);
    }

    #[test]
    fn test_inverted_dmr_voice() {
        let mut decoder = quiet_decoder();
        decoder.set_inverted_dmr(true);

        // a voice sync on an inverted channel arrives as the data pattern
        let mut stream = filler(24);
        stream.extend_from_slice(DMR_BS_DATA_SYNC);
        feed_symbols(&mut decoder, &stream);

        assert_eq!(decoder.fsm_state(), FsmState::SyncFound);
        assert_eq!(decoder.last_sync_code(), 11);

        feed_symbols(&mut decoder, &filler(1));
        assert_eq!(decoder.fsm_state(), FsmState::ProcessDmrVoice);
        assert_eq!(decoder.frame_info().frame_subtype.label(), " VOICE        ");
    }

    #[test]
    fn test_dstar_dispatch() {
        let mut decoder = quiet_decoder();
        decoder.set_decode_mode(DecodeMode::DStar, true);

        let mut stream = filler(24);
        stream.extend_from_slice(DSTAR_SYNC);
        feed_symbols(&mut decoder, &stream);
        assert_eq!(decoder.last_sync_code(), 6);
        assert_eq!(decoder.frame_info().frame_type.label(), " D-STAR      ");

        feed_symbols(&mut decoder, &filler(1));
        assert_eq!(decoder.fsm_state(), FsmState::ProcessDstar);
        assert_eq!(decoder.frame_info().frame_subtype, FrameSubtype::Voice);
    }

    #[test]
    fn test_dstar_hd_dispatch() {
        let mut decoder = quiet_decoder();
        decoder.set_decode_mode(DecodeMode::DStar, true);

        let mut stream = filler(24);
        stream.extend_from_slice(INV_DSTAR_HD_SYNC);
        feed_symbols(&mut decoder, &stream);
        assert_eq!(decoder.last_sync_code(), 19);

        feed_symbols(&mut decoder, &filler(1));
        assert_eq!(decoder.fsm_state(), FsmState::ProcessDstarHd);
        assert_eq!(decoder.frame_info().frame_subtype, FrameSubtype::Data);
    }

    #[test]
    fn test_nxdn_double_match_then_no_processor() {
        // only NXDN96 enabled
        let opts = DecoderOptions {
            frame_dmr: false,
            frame_p25p1: false,
            frame_x2tdma: false,
            frame_nxdn96: true,
            ..DecoderOptions::default()
        };
        let mut decoder = Decoder::with_options(opts);
        decoder.set_quiet();

        let mut stream = filler(24);
        stream.extend_from_slice(NXDN_BS_VOICE_SYNC);
        feed_symbols(&mut decoder, &stream);

        // first presentation only latches
        assert_eq!(decoder.fsm_state(), FsmState::LookForSync);
        assert_eq!(decoder.last_sync_code(), 8);

        // second presentation confirms
        feed_symbols(&mut decoder, NXDN_BS_VOICE_SYNC);
        assert_eq!(decoder.fsm_state(), FsmState::SyncFound);
        assert!(decoder.has_sync());

        // no NXDN processor: the dispatcher drops carrier and resumes
        feed_symbols(&mut decoder, &filler(1));
        assert_eq!(decoder.fsm_state(), FsmState::LookForSync);
        assert!(!decoder.has_sync());
        assert!(!decoder.carrier());
    }

    #[test]
    fn test_p25_sync_has_no_processor() {
        let mut decoder = quiet_decoder();

        let mut stream = filler(24);
        stream.extend_from_slice(P25P1_SYNC);
        feed_symbols(&mut decoder, &stream);
        assert_eq!(decoder.fsm_state(), FsmState::SyncFound);
        assert_eq!(decoder.last_sync_code(), 0);

        feed_symbols(&mut decoder, &filler(1));
        assert_eq!(decoder.fsm_state(), FsmState::LookForSync);
        assert!(!decoder.carrier());
    }

    #[test]
    fn test_modulation_switch_from_samples() {
        let mut decoder = quiet_decoder();
        assert_eq!(decoder.modulation(), Modulation::C4fm);

        // rapid zero crossings force the QPSK decision
        for i in 0..240 {
            decoder.run(if i % 2 == 0 { 500 } else { -500 });
        }
        assert_eq!(decoder.modulation(), Modulation::Qpsk);

        // steady symbols flip back to C4FM on a later window
        for _ in 0..480 {
            decoder.run(HIGH);
        }
        assert_eq!(decoder.modulation(), Modulation::C4fm);
    }

    #[test]
    fn test_modulation_preset_forces_selection() {
        let mut decoder = quiet_decoder();
        decoder.set_modulation_optimizations(ModulationPreset::Qpsk);
        assert_eq!(decoder.modulation(), Modulation::Qpsk);
        assert!(decoder.options().mod_qpsk);
        assert!(!decoder.options().mod_c4fm);

        // C4FM decision is gated off; QPSK sticks
        for _ in 0..480 {
            decoder.run(HIGH);
        }
        assert_eq!(decoder.modulation(), Modulation::Qpsk);
    }

    #[test]
    fn test_reset_frame_sync_idempotent() {
        let mut decoder = quiet_decoder();
        feed_symbols(&mut decoder, &filler(50));

        decoder.reset_frame_sync();
        let fsm = decoder.fsm_state();
        let has_sync = decoder.has_sync();
        let carrier = decoder.carrier();
        decoder.reset_frame_sync();

        assert_eq!(decoder.fsm_state(), fsm);
        assert_eq!(decoder.has_sync(), has_sync);
        assert_eq!(decoder.carrier(), carrier);
    }

    #[test]
    fn test_level_invariant_holds_throughout() {
        let mut decoder = quiet_decoder();

        let mut seed: u32 = 0x2545_f491;
        for _ in 0..30_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let sample = (seed >> 16) as i16;
            decoder.run(sample);
            let levels = decoder.levels();
            assert!(levels.min() <= levels.center());
            assert!(levels.center() <= levels.max());
        }
    }

    #[test]
    fn test_sync_trace_is_deterministic() {
        let collect_trace = |samples: &[i16]| -> Vec<(i32, u32)> {
            let mut decoder = quiet_decoder();
            let mut trace = Vec::new();
            let mut prev = decoder.fsm_state();
            for &sample in samples {
                decoder.run(sample);
                let state = decoder.fsm_state();
                if state == FsmState::SyncFound && prev != FsmState::SyncFound {
                    trace.push((decoder.last_sync_code(), decoder.sync_offset()));
                }
                prev = state;
            }
            trace
        };

        // noise with embedded DMR syncs
        let mut chars = Vec::new();
        let mut seed: u32 = 99;
        for block in 0..4 {
            for _ in 0..100 {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                chars.push(if seed & 0x1000 == 0 { b'1' } else { b'3' });
            }
            chars.extend_from_slice(if block % 2 == 0 {
                DMR_BS_VOICE_SYNC
            } else {
                DMR_BS_DATA_SYNC
            });
        }

        let mut samples = Vec::new();
        for &ch in &chars {
            let level = if ch == b'1' { HIGH } else { -HIGH };
            for _ in 0..10 {
                samples.push(level);
            }
        }

        let first = collect_trace(&samples);
        let second = collect_trace(&samples);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_history_capacity_validated() {
        assert!(Decoder::with_history_capacity(DecoderOptions::default(), 100).is_err());
        assert!(Decoder::with_history_capacity(DecoderOptions::default(), 10_000).is_ok());
    }

    #[test]
    fn test_no_carrier_restores_panel() {
        let mut decoder = quiet_decoder();

        let mut stream = filler(24);
        stream.extend_from_slice(DMR_BS_VOICE_SYNC);
        feed_symbols(&mut decoder, &stream);
        feed_symbols(&mut decoder, &filler(1));
        assert_eq!(decoder.fsm_state(), FsmState::ProcessDmrVoice);

        decoder.no_carrier();
        assert!(!decoder.carrier());
        assert_eq!(decoder.last_sync_code(), -1);
        assert_eq!(decoder.frame_info().frame_type.label(), "             ");
        assert_eq!(decoder.frame_info().frame_subtype.label(), "              ");
        assert_eq!(decoder.frame_info().slot0_light(), " slot0 ");
        assert_eq!(decoder.levels().max(), 15_000);
    }
}
