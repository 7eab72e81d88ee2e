//! Per-symbol multi-pattern sync search
//!
//! [`SyncMatcher::advance`] is called once per sliced symbol. It maintains
//! the 24-symbol amplitude window, the modulation decision cadence, and the
//! rolling dibit-character window, then tries every enabled pattern family
//! in a fixed order against the trailing characters. The first exact match
//! wins; there is no fuzzy matching at this layer.

use openlmr_core::buffer::{Dibit, SyncWindow};

use crate::levels::LevelTracker;
use crate::modulation::{self, Modulation, DECISION_WINDOW};
use crate::patterns::*;

/// Symbols in the amplitude min/max window
pub const LEVEL_WINDOW: usize = 24;
/// Symbols buffered before pattern comparison starts
pub const PRIME_SYMBOLS: u32 = 18;
/// Search positions without a match before carrier is declared lost
pub const NO_SYNC_TIMEOUT: u32 = 1800;

/// Enable flags and tunables consulted by the matcher on every symbol
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    pub frame_p25p1: bool,
    pub frame_x2tdma: bool,
    pub frame_dmr: bool,
    pub frame_provoice: bool,
    pub frame_nxdn48: bool,
    pub frame_nxdn96: bool,
    pub frame_dstar: bool,
    pub inverted_dmr: bool,
    pub inverted_x2tdma: bool,
    pub mod_c4fm: bool,
    pub mod_qpsk: bool,
    pub mod_gfsk: bool,
    pub mod_threshold: u32,
    pub ssize: usize,
    pub msize: usize,
    pub samples_per_symbol: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            frame_p25p1: true,
            frame_x2tdma: true,
            frame_dmr: true,
            frame_provoice: false,
            frame_nxdn48: false,
            frame_nxdn96: false,
            frame_dstar: false,
            inverted_dmr: false,
            inverted_x2tdma: false,
            mod_c4fm: true,
            mod_qpsk: true,
            mod_gfsk: true,
            mod_threshold: 26,
            ssize: 36,
            msize: 15,
            samples_per_symbol: 10,
        }
    }
}

/// A confirmed sync pattern match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncHit {
    pub id: SyncId,
    pub frame_type: FrameType,
    pub offset: u32,
}

/// Outcome of one matcher step.
///
/// On `Miss` (search timed out) and on `Pending { carrier_dropped: true }`
/// (the search window wrapped) the caller owns the carrier-loss reset and
/// must complete it, including [`SyncMatcher::drop_carrier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// Still accumulating; no decision this symbol
    Pending { carrier_dropped: bool },
    /// No pattern found within the search window
    Miss,
    /// A pattern matched on this symbol
    Hit(SyncHit),
}

/// Rolling sync-search engine
#[derive(Debug, Clone)]
pub struct SyncMatcher {
    window: SyncWindow,
    lbuf: [i32; LEVEL_WINDOW],
    sorted: [i32; LEVEL_WINDOW],
    lidx: usize,
    lastt: usize,
    t: u32,
    lmin: i32,
    lmax: i32,
    numflips: u32,
    modulation: Modulation,
    carrier: bool,
    offset: u32,
    lastsynctype: i32,
    lastp25type: i32,
    firstframe: bool,
}

impl SyncMatcher {
    pub fn new() -> Self {
        Self {
            window: SyncWindow::new(),
            lbuf: [0; LEVEL_WINDOW],
            sorted: [0; LEVEL_WINDOW],
            lidx: 0,
            lastt: 0,
            t: 0,
            lmin: 0,
            lmax: 0,
            numflips: 0,
            modulation: Modulation::C4fm,
            carrier: false,
            offset: 0,
            lastsynctype: -1,
            lastp25type: 0,
            firstframe: false,
        }
    }

    pub fn carrier(&self) -> bool {
        self.carrier
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn last_sync_code(&self) -> i32 {
        self.lastsynctype
    }

    pub fn first_frame(&self) -> bool {
        self.firstframe
    }

    pub fn modulation(&self) -> Modulation {
        self.modulation
    }

    /// Force the modulation (used by the optimisation presets)
    pub fn set_modulation(&mut self, modulation: Modulation) {
        self.modulation = modulation;
    }

    /// Fold zero-crossing counts from the slicer into the decision window
    pub fn accumulate_flips(&mut self, flips: u32) {
        self.numflips += flips;
    }

    /// True once enough symbols are buffered for level estimation
    pub fn primed(&self) -> bool {
        self.t >= PRIME_SYMBOLS
    }

    pub fn level_index(&self) -> usize {
        self.lidx
    }

    /// Sorted copy of the amplitude window (valid once primed)
    pub fn sorted_window(&self) -> &[i32; LEVEL_WINDOW] {
        &self.sorted
    }

    pub fn window_position(&self) -> u32 {
        self.window.position()
    }

    /// Process one sliced symbol while searching for sync
    pub fn advance(
        &mut self,
        symbol: i32,
        cfg: &SyncConfig,
        levels: &mut LevelTracker,
    ) -> SearchStep {
        self.t += 1;
        self.lbuf[self.lidx] = symbol;
        levels.record_symbol(symbol, cfg.ssize);

        if self.lidx == LEVEL_WINDOW - 1 {
            self.lidx = 0;
        } else {
            self.lidx += 1;
        }

        if self.lastt == DECISION_WINDOW as usize - 1 {
            self.lastt = 0;
            self.modulation = modulation::select(
                self.numflips,
                self.modulation,
                cfg.mod_threshold,
                cfg.mod_c4fm,
                cfg.mod_qpsk,
                cfg.mod_gfsk,
            );
            self.numflips = 0;
        } else {
            self.lastt += 1;
        }

        self.window.push(Dibit::from_symbol(symbol).as_char());

        if self.primed() {
            self.sorted = self.lbuf;
            self.sorted.sort_unstable();
            self.lmin = (self.sorted[2] + self.sorted[3] + self.sorted[4]) / 3;
            self.lmax = (self.sorted[21] + self.sorted[20] + self.sorted[19]) / 3;

            if self.modulation == Modulation::Qpsk {
                levels.track_qpsk(self.lmin, self.lmax, cfg.msize);
            } else {
                levels.pin_refs();
            }

            if let Some(step) = self.try_patterns(cfg, levels) {
                return step;
            }

            if let Some(step) = self.try_resume(cfg, levels) {
                return step;
            }
        }

        if self.window.advance() {
            return SearchStep::Pending {
                carrier_dropped: true,
            };
        }

        if self.lastsynctype != 1 && self.window.position() >= NO_SYNC_TIMEOUT {
            return SearchStep::Miss;
        }

        SearchStep::Pending {
            carrier_dropped: false,
        }
    }

    /// Clear the search working set; carrier and level history are kept
    pub fn reset_search(&mut self) {
        for slot in &mut self.lbuf[PRIME_SYMBOLS as usize..] {
            *slot = 0;
        }
        for slot in &mut self.sorted[PRIME_SYMBOLS as usize..] {
            *slot = 0;
        }

        self.t = 0;
        self.window.reset();
        self.lmin = 0;
        self.lmax = 0;
        self.lidx = 0;
        self.lastt = 0;
        self.numflips = 0;
    }

    /// Forget the sync context after carrier loss
    pub fn drop_carrier(&mut self) {
        self.lastsynctype = -1;
        self.lastp25type = 0;
        self.carrier = false;
        self.firstframe = false;
    }

    fn lock(
        &mut self,
        levels: &mut LevelTracker,
        id: SyncId,
        frame_type: FrameType,
    ) -> SearchStep {
        self.carrier = true;
        self.offset = self.window.position();
        levels.average_toward(self.lmin, self.lmax);
        self.lastsynctype = id.code();

        SearchStep::Hit(SyncHit {
            id,
            frame_type,
            offset: self.offset,
        })
    }

    /// Re-recognise a lock without a fresh pattern; the next window must
    /// produce a real match
    fn relock(
        &mut self,
        levels: &mut LevelTracker,
        id: SyncId,
        frame_type: FrameType,
    ) -> SearchStep {
        let step = self.lock(levels, id, frame_type);
        self.lastsynctype = -1;
        step
    }

    fn try_patterns(&mut self, cfg: &SyncConfig, levels: &mut LevelTracker) -> Option<SearchStep> {
        use FrameKind::*;
        use Polarity::*;
        use SyncFamily::*;

        let w24 = self.window.tail_array::<24>();

        if let Some(w) = w24 {
            if cfg.frame_p25p1 {
                if w == *P25P1_SYNC {
                    return Some(self.lock(
                        levels,
                        SyncId::new(P25Phase1, Normal, Voice),
                        FrameType::P25Phase1,
                    ));
                }
                if w == *INV_P25P1_SYNC {
                    return Some(self.lock(
                        levels,
                        SyncId::new(P25Phase1, Inverted, Voice),
                        FrameType::P25Phase1,
                    ));
                }
            }

            if cfg.frame_x2tdma {
                if w == *X2TDMA_BS_DATA_SYNC || w == *X2TDMA_MS_DATA_SYNC {
                    return Some(if !cfg.inverted_x2tdma {
                        self.lock(levels, SyncId::new(X2Tdma, Normal, Data), FrameType::X2Tdma)
                    } else {
                        // inverted signal carries voice under the data pattern
                        if self.lastsynctype != 3 {
                            self.firstframe = true;
                        }
                        self.lock(
                            levels,
                            SyncId::new(X2Tdma, Inverted, Voice),
                            FrameType::X2Tdma,
                        )
                    });
                }
                if w == *X2TDMA_BS_VOICE_SYNC || w == *X2TDMA_MS_VOICE_SYNC {
                    return Some(if !cfg.inverted_x2tdma {
                        if self.lastsynctype != 4 {
                            self.firstframe = true;
                        }
                        self.lock(levels, SyncId::new(X2Tdma, Normal, Voice), FrameType::X2Tdma)
                    } else {
                        self.lock(
                            levels,
                            SyncId::new(X2Tdma, Inverted, Data),
                            FrameType::X2Tdma,
                        )
                    });
                }
            }

            if cfg.frame_dmr {
                if w == *DMR_MS_DATA_SYNC || w == *DMR_BS_DATA_SYNC {
                    return Some(if !cfg.inverted_dmr {
                        self.lock(levels, SyncId::new(Dmr, Normal, Data), FrameType::Dmr)
                    } else {
                        // inverted signal carries voice under the data pattern
                        if self.lastsynctype != 11 {
                            self.firstframe = true;
                        }
                        self.lock(levels, SyncId::new(Dmr, Inverted, Voice), FrameType::Dmr)
                    });
                }
                if w == *DMR_MS_VOICE_SYNC || w == *DMR_BS_VOICE_SYNC {
                    return Some(if !cfg.inverted_dmr {
                        if self.lastsynctype != 12 {
                            self.firstframe = true;
                        }
                        self.lock(levels, SyncId::new(Dmr, Normal, Voice), FrameType::Dmr)
                    } else {
                        self.lock(levels, SyncId::new(Dmr, Inverted, Data), FrameType::Dmr)
                    });
                }
            }
        }

        if cfg.frame_provoice {
            if let Some(w) = self.window.tail_array::<32>() {
                if w == *PROVOICE_SYNC || w == *PROVOICE_EA_SYNC {
                    return Some(self.lock(
                        levels,
                        SyncId::new(ProVoice, Normal, Voice),
                        FrameType::ProVoice,
                    ));
                }
                if w == *INV_PROVOICE_SYNC || w == *INV_PROVOICE_EA_SYNC {
                    return Some(self.lock(
                        levels,
                        SyncId::new(ProVoice, Inverted, Voice),
                        FrameType::ProVoice,
                    ));
                }
            }
        }

        if cfg.frame_nxdn96 || cfg.frame_nxdn48 {
            if let Some(w) = self.window.tail_array::<18>() {
                let frame_type = if cfg.samples_per_symbol == 20 {
                    FrameType::Nxdn48
                } else {
                    FrameType::Nxdn96
                };

                // an NXDN sync only counts once a prior window already saw
                // NXDN of the same polarity
                if w == *NXDN_BS_VOICE_SYNC || w == *NXDN_MS_VOICE_SYNC {
                    if self.lastsynctype == 8 || self.lastsynctype == 16 {
                        return Some(self.lock(levels, SyncId::new(Nxdn, Normal, Voice), frame_type));
                    }
                    self.lastsynctype = 8;
                } else if w == *INV_NXDN_BS_VOICE_SYNC || w == *INV_NXDN_MS_VOICE_SYNC {
                    if self.lastsynctype == 9 || self.lastsynctype == 17 {
                        return Some(self.lock(
                            levels,
                            SyncId::new(Nxdn, Inverted, Voice),
                            frame_type,
                        ));
                    }
                    self.lastsynctype = 9;
                } else if w == *NXDN_BS_DATA_SYNC || w == *NXDN_MS_DATA_SYNC {
                    if self.lastsynctype == 8 || self.lastsynctype == 16 {
                        return Some(self.lock(levels, SyncId::new(Nxdn, Normal, Data), frame_type));
                    }
                    self.lastsynctype = 16;
                } else if w == *INV_NXDN_BS_DATA_SYNC || w == *INV_NXDN_MS_DATA_SYNC {
                    if self.lastsynctype == 9 || self.lastsynctype == 17 {
                        return Some(self.lock(
                            levels,
                            SyncId::new(Nxdn, Inverted, Data),
                            frame_type,
                        ));
                    }
                    self.lastsynctype = 17;
                }
            }
        }

        if cfg.frame_dstar {
            if let Some(w) = w24 {
                if w == *DSTAR_SYNC {
                    return Some(self.lock(
                        levels,
                        SyncId::new(DStar, Normal, Voice),
                        FrameType::DStar,
                    ));
                }
                if w == *INV_DSTAR_SYNC {
                    return Some(self.lock(
                        levels,
                        SyncId::new(DStar, Inverted, Voice),
                        FrameType::DStar,
                    ));
                }
                if w == *DSTAR_HD_SYNC {
                    return Some(self.lock(
                        levels,
                        SyncId::new(DStarHd, Normal, Data),
                        FrameType::DStarHd,
                    ));
                }
                if w == *INV_DSTAR_HD_SYNC {
                    return Some(self.lock(
                        levels,
                        SyncId::new(DStarHd, Inverted, Data),
                        FrameType::DStarHd,
                    ));
                }
            }
        }

        None
    }

    /// Soft re-recognition at the first full window after a reset: an
    /// intra-frame window that is not itself a sync pattern keeps the lock
    /// of the previously confirmed family.
    fn try_resume(&mut self, _cfg: &SyncConfig, levels: &mut LevelTracker) -> Option<SearchStep> {
        use FrameKind::*;
        use Polarity::*;
        use SyncFamily::*;

        if self.t != DECISION_WINDOW || self.lastsynctype == -1 {
            return None;
        }

        let w = self.window.tail_array::<24>()?;
        let p25_active = self.lastp25type == 1 || self.lastp25type == 2;

        if self.lastsynctype == 0 && p25_active {
            return Some(self.relock(
                levels,
                SyncId::new(P25Phase1, Normal, Voice),
                FrameType::P25Phase1Resumed,
            ));
        }
        if self.lastsynctype == 1 && p25_active {
            return Some(self.relock(
                levels,
                SyncId::new(P25Phase1, Inverted, Voice),
                FrameType::P25Phase1Resumed,
            ));
        }
        // the window cannot equal both patterns at once, so each of the
        // guards below holds for any input and the prior lock is refreshed
        if self.lastsynctype == 3
            && (w != *X2TDMA_BS_VOICE_SYNC || w != *X2TDMA_MS_VOICE_SYNC)
        {
            return Some(self.relock(
                levels,
                SyncId::new(X2Tdma, Inverted, Voice),
                FrameType::X2TdmaResumed,
            ));
        }
        if self.lastsynctype == 4
            && (w != *X2TDMA_BS_DATA_SYNC || w != *X2TDMA_MS_DATA_SYNC)
        {
            return Some(self.relock(
                levels,
                SyncId::new(X2Tdma, Normal, Voice),
                FrameType::X2TdmaResumed,
            ));
        }
        if self.lastsynctype == 11 && (w != *DMR_BS_VOICE_SYNC || w != *DMR_MS_VOICE_SYNC) {
            return Some(self.relock(
                levels,
                SyncId::new(Dmr, Inverted, Voice),
                FrameType::DmrResumed,
            ));
        }
        if self.lastsynctype == 12 && (w != *DMR_BS_DATA_SYNC || w != *DMR_MS_DATA_SYNC) {
            return Some(self.relock(
                levels,
                SyncId::new(Dmr, Normal, Voice),
                FrameType::DmrResumed,
            ));
        }

        None
    }
}

impl Default for SyncMatcher {
    fn default() -> Self {
        Self::new()
    }
}
