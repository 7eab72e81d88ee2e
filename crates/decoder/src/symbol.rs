//! PCM sample to symbol slicing
//!
//! The slicer accumulates samples at the configured symbol cadence and emits
//! the mean of a short window around the symbol centre. It also maintains
//! the side channels the search engine feeds on: the zero-crossing counter
//! for modulation detection, a jitter estimate from crossing positions, and
//! the running symbol count.

use tracing::info;

/// Default samples per symbol (4800 baud at 48 kHz)
pub const DEFAULT_SAMPLES_PER_SYMBOL: u32 = 10;
/// Supported cadence bounds (9600 baud ProVoice up to 2400 baud NXDN)
pub const MIN_SAMPLES_PER_SYMBOL: u32 = 5;
pub const MAX_SAMPLES_PER_SYMBOL: u32 = 20;

/// Free-running symbol slicer
#[derive(Debug, Clone)]
pub struct SymbolSlicer {
    samples_per_symbol: u32,
    center: u32,
    sample_index: u32,
    sum: i32,
    count: u32,
    symbol: i32,
    last_sample: i32,
    flips: u32,
    jitter: i32,
    symbol_count: u32,
}

impl SymbolSlicer {
    pub fn new() -> Self {
        Self::with_samples_per_symbol(DEFAULT_SAMPLES_PER_SYMBOL)
    }

    pub fn with_samples_per_symbol(samples_per_symbol: u32) -> Self {
        let samples_per_symbol =
            samples_per_symbol.clamp(MIN_SAMPLES_PER_SYMBOL, MAX_SAMPLES_PER_SYMBOL);
        Self {
            samples_per_symbol,
            center: samples_per_symbol / 2 - 1,
            sample_index: 0,
            sum: 0,
            count: 0,
            symbol: 0,
            last_sample: 0,
            flips: 0,
            jitter: -1,
            symbol_count: 0,
        }
    }

    pub fn samples_per_symbol(&self) -> u32 {
        self.samples_per_symbol
    }

    /// Change the symbol cadence, clamped to the supported bounds
    pub fn set_samples_per_symbol(&mut self, samples_per_symbol: u32) {
        self.samples_per_symbol =
            samples_per_symbol.clamp(MIN_SAMPLES_PER_SYMBOL, MAX_SAMPLES_PER_SYMBOL);
        self.center = self.samples_per_symbol / 2 - 1;
        self.sample_index = 0;
        self.sum = 0;
        self.count = 0;
        info!("Setting {} samples per symbol", self.samples_per_symbol);
    }

    /// Most recently emitted symbol
    pub fn symbol(&self) -> i32 {
        self.symbol
    }

    /// Timing estimate from the last zero crossing, -1 when idle
    pub fn jitter(&self) -> i32 {
        self.jitter
    }

    pub fn symbol_count(&self) -> u32 {
        self.symbol_count
    }

    pub fn reset_symbol_count(&mut self) {
        self.symbol_count = 0;
    }

    /// Drain the zero-crossing count accumulated since the last call
    pub fn take_flips(&mut self) -> u32 {
        std::mem::take(&mut self.flips)
    }

    /// Push one PCM sample; returns true when a symbol was emitted.
    ///
    /// While searching (`has_sync` false) the crossing position is recorded
    /// as the jitter estimate; with sync locked the timing is left alone.
    pub fn push_sample(&mut self, sample: i16, has_sync: bool) -> bool {
        let sample = sample as i32;

        if (sample > 0 && self.last_sample < 0) || (sample < 0 && self.last_sample > 0) {
            self.flips += 1;
            if !has_sync {
                self.jitter = self.sample_index as i32;
            }
        }
        self.last_sample = sample;

        if self.sample_index >= self.center.saturating_sub(1)
            && self.sample_index <= self.center + 2
        {
            self.sum += sample;
            self.count += 1;
        }

        self.sample_index += 1;

        if self.sample_index == self.samples_per_symbol {
            self.symbol = self.sum / self.count.max(1) as i32;
            self.sample_index = 0;
            self.sum = 0;
            self.count = 0;
            self.symbol_count = self.symbol_count.wrapping_add(1);
            return true;
        }

        false
    }

    /// Forget timing context after carrier loss
    pub fn carrier_lost(&mut self) {
        self.jitter = -1;
    }
}

impl Default for SymbolSlicer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emits_every_cadence() {
        let mut slicer = SymbolSlicer::new();
        let mut emitted = 0;
        for _ in 0..100 {
            if slicer.push_sample(1_000, false) {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 10);
        assert_eq!(slicer.symbol_count(), 10);
    }

    #[test]
    fn test_symbol_tracks_input_level() {
        let mut slicer = SymbolSlicer::new();
        for _ in 0..10 {
            slicer.push_sample(3_000, false);
        }
        assert_eq!(slicer.symbol(), 3_000);

        for _ in 0..10 {
            slicer.push_sample(-3_000, false);
        }
        assert_eq!(slicer.symbol(), -3_000);
    }

    #[test]
    fn test_flip_counting() {
        let mut slicer = SymbolSlicer::new();
        for i in 0..40 {
            let sample = if i % 2 == 0 { 500 } else { -500 };
            slicer.push_sample(sample, false);
        }
        // every sample after the first crosses zero
        assert_eq!(slicer.take_flips(), 39);
        assert_eq!(slicer.take_flips(), 0);
    }

    #[test]
    fn test_cadence_clamped() {
        let slicer = SymbolSlicer::with_samples_per_symbol(100);
        assert_eq!(slicer.samples_per_symbol(), MAX_SAMPLES_PER_SYMBOL);
        let slicer = SymbolSlicer::with_samples_per_symbol(1);
        assert_eq!(slicer.samples_per_symbol(), MIN_SAMPLES_PER_SYMBOL);
    }

    #[test]
    fn test_jitter_only_tracked_while_searching() {
        let mut slicer = SymbolSlicer::new();
        slicer.push_sample(500, true);
        slicer.push_sample(-500, true);
        assert_eq!(slicer.jitter(), -1);

        slicer.push_sample(500, false);
        assert!(slicer.jitter() >= 0);

        slicer.carrier_lost();
        assert_eq!(slicer.jitter(), -1);
    }
}
