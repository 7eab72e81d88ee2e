//! DMR voice and data frame processors
//!
//! A DMR burst is 144 dibits on the air: a 12-dibit CACH, 54 payload dibits,
//! the 24-dibit sync/embedded-signalling region, and 54 more payload dibits.
//! The sync matcher fires on the last dibit of the sync region, so the first
//! burst only has its trailing payload half left to consume. A voice
//! transmission runs as a six-burst superframe with embedded signalling in
//! place of sync after the first burst; data bursts stand alone and are
//! re-synced individually.

use tracing::debug;

use crate::common::{FrameContext, FrameEvent, FrameInfo, FrameProcessor, SlotActivity};
use crate::{ProtocolError, Result};

/// CACH dibits leading each burst
pub const DMR_CACH_DIBITS: usize = 12;
/// Payload dibits on each side of the sync region
pub const DMR_PAYLOAD_HALF_DIBITS: usize = 54;
/// Sync / embedded-signalling dibits in the middle of a burst
pub const DMR_SYNC_DIBITS: usize = 24;
/// Whole burst, CACH included
pub const DMR_BURST_DIBITS: usize =
    DMR_CACH_DIBITS + 2 * DMR_PAYLOAD_HALF_DIBITS + DMR_SYNC_DIBITS;
/// Bursts in a voice superframe
pub const DMR_SUPERFRAME_BURSTS: usize = 6;

/// Voice superframe processor
#[derive(Debug, Clone)]
pub struct DmrVoiceProcessor {
    superframe_bursts: usize,
    burst: usize,
    pos: usize,
    active_slot: usize,
}

impl DmrVoiceProcessor {
    pub fn new() -> Self {
        Self {
            superframe_bursts: DMR_SUPERFRAME_BURSTS,
            burst: 0,
            pos: 0,
            active_slot: 0,
        }
    }

    /// Processor with a shortened superframe (scan use)
    pub fn with_superframe_bursts(bursts: usize) -> Result<Self> {
        if bursts == 0 || bursts > DMR_SUPERFRAME_BURSTS {
            return Err(ProtocolError::InvalidParameters {
                msg: format!(
                    "superframe bursts must be within 1..={}, got {}",
                    DMR_SUPERFRAME_BURSTS, bursts
                ),
            });
        }

        Ok(Self {
            superframe_bursts: bursts,
            ..Self::new()
        })
    }

    fn burst_dibits(&self) -> usize {
        if self.burst == 0 {
            // sync already consumed the leading half of the first burst
            DMR_PAYLOAD_HALF_DIBITS
        } else {
            DMR_BURST_DIBITS
        }
    }

    fn mark_slots(&self, info: &mut FrameInfo) {
        if self.active_slot == 0 {
            info.slot0 = SlotActivity::Active;
            info.slot1 = SlotActivity::Idle;
        } else {
            info.slot0 = SlotActivity::Idle;
            info.slot1 = SlotActivity::Active;
        }
    }
}

impl FrameProcessor for DmrVoiceProcessor {
    fn init(&mut self, info: &mut FrameInfo) {
        self.burst = 0;
        self.pos = 0;
        self.active_slot = 0;
        self.mark_slots(info);
    }

    fn process(&mut self, ctx: &mut FrameContext<'_>) -> FrameEvent {
        self.pos += 1;

        if self.pos == self.burst_dibits() {
            self.burst += 1;
            self.pos = 0;
            self.active_slot ^= 1;
            self.mark_slots(ctx.info);

            if self.burst == self.superframe_bursts {
                debug!(bursts = self.burst, "DMR voice superframe complete");
                return FrameEvent::Complete;
            }
        }

        FrameEvent::InProgress
    }
}

impl Default for DmrVoiceProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-burst data processor
#[derive(Debug, Clone, Default)]
pub struct DmrDataProcessor {
    pos: usize,
}

impl DmrDataProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameProcessor for DmrDataProcessor {
    fn init(&mut self, info: &mut FrameInfo) {
        self.pos = 0;
        info.slot0 = SlotActivity::Active;
        info.slot1 = SlotActivity::Idle;
    }

    fn process(&mut self, ctx: &mut FrameContext<'_>) -> FrameEvent {
        self.pos += 1;

        if self.pos == DMR_PAYLOAD_HALF_DIBITS {
            ctx.info.slot0 = SlotActivity::Idle;
            debug!("DMR data burst complete");
            return FrameEvent::Complete;
        }

        FrameEvent::InProgress
    }
}
