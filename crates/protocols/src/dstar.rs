//! D-STAR voice and radio-header frame processors
//!
//! D-STAR voice alternates 72 bits of AMBE voice with 24 bits of slow data
//! per frame (96 symbols at one bit per symbol); every 21st frame replaces
//! the slow data with the sync pattern. The radio header is a single
//! 660-symbol block announced by its own preamble.

use tracing::debug;

use crate::common::{FrameContext, FrameEvent, FrameInfo, FrameProcessor};

/// Symbols per voice + slow-data frame
pub const DSTAR_FRAME_SYMBOLS: usize = 96;
/// Frames between sync patterns
pub const DSTAR_SYNC_INTERVAL_FRAMES: usize = 21;
/// Symbols in the radio header block
pub const DSTAR_HEADER_SYMBOLS: usize = 660;

/// Voice stream processor
#[derive(Debug, Clone, Default)]
pub struct DstarProcessor {
    frame: usize,
    pos: usize,
}

impl DstarProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames consumed since the last sync
    pub fn frames_done(&self) -> usize {
        self.frame
    }
}

impl FrameProcessor for DstarProcessor {
    fn init(&mut self, _info: &mut FrameInfo) {
        self.frame = 0;
        self.pos = 0;
    }

    fn process(&mut self, _ctx: &mut FrameContext<'_>) -> FrameEvent {
        self.pos += 1;

        if self.pos == DSTAR_FRAME_SYMBOLS {
            self.frame += 1;
            self.pos = 0;

            if self.frame == DSTAR_SYNC_INTERVAL_FRAMES {
                debug!(frames = self.frame, "D-STAR voice segment complete");
                return FrameEvent::Complete;
            }
        }

        FrameEvent::InProgress
    }
}

/// Radio header processor
#[derive(Debug, Clone, Default)]
pub struct DstarHdProcessor {
    pos: usize,
}

impl DstarHdProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameProcessor for DstarHdProcessor {
    fn init(&mut self, _info: &mut FrameInfo) {
        self.pos = 0;
    }

    fn process(&mut self, _ctx: &mut FrameContext<'_>) -> FrameEvent {
        self.pos += 1;

        if self.pos == DSTAR_HEADER_SYMBOLS {
            debug!("D-STAR radio header complete");
            return FrameEvent::Complete;
        }

        FrameEvent::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openlmr_core::buffer::Dibit;

    fn run_to_completion(processor: &mut dyn FrameProcessor, info: &mut FrameInfo) -> usize {
        processor.init(info);
        let mut consumed = 0;
        loop {
            let mut ctx = FrameContext {
                symbol: -3_000,
                dibit: Dibit::Negative,
                info: &mut *info,
            };
            consumed += 1;
            if processor.process(&mut ctx) == FrameEvent::Complete {
                return consumed;
            }
            assert!(consumed < 10_000, "processor never completed");
        }
    }

    #[test]
    fn test_voice_segment_length() {
        let mut info = FrameInfo::new();
        let mut processor = DstarProcessor::new();
        let consumed = run_to_completion(&mut processor, &mut info);
        assert_eq!(consumed, DSTAR_FRAME_SYMBOLS * DSTAR_SYNC_INTERVAL_FRAMES);
        assert_eq!(processor.frames_done(), DSTAR_SYNC_INTERVAL_FRAMES);
    }

    #[test]
    fn test_header_length() {
        let mut info = FrameInfo::new();
        let mut processor = DstarHdProcessor::new();
        let consumed = run_to_completion(&mut processor, &mut info);
        assert_eq!(consumed, DSTAR_HEADER_SYMBOLS);
    }
}
