//! Processor capability trait and shared frame display state

use openlmr_core::buffer::Dibit;
use openlmr_sync::patterns::{FrameSubtype, FrameType};

/// Outcome of processing one symbol inside a locked frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// The frame continues; feed the next symbol
    InProgress,
    /// The frame is done; the decoder must resume the sync search
    Complete,
}

/// TDMA slot activity shown in the status panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotActivity {
    #[default]
    Idle,
    Active,
}

impl SlotActivity {
    pub fn light(&self, slot: usize) -> &'static str {
        match (self, slot) {
            (SlotActivity::Idle, 0) => " slot0 ",
            (SlotActivity::Idle, _) => " slot1 ",
            (SlotActivity::Active, 0) => "[slot0]",
            (SlotActivity::Active, _) => "[slot1]",
        }
    }
}

/// Call state shown in the status panel and updated by the processors.
///
/// Labels render from the tagged variants only at the display boundary.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub frame_type: FrameType,
    pub frame_subtype: FrameSubtype,
    pub nac: u32,
    pub last_src: u32,
    pub last_tg: u32,
    pub err_str: String,
    pub slot0: SlotActivity,
    pub slot1: SlotActivity,
    pub alg_id: String,
    pub key_id: String,
}

impl FrameInfo {
    pub const ALG_ID_CLEARED: &'static str = "________";
    pub const KEY_ID_CLEARED: &'static str = "________________";

    pub fn new() -> Self {
        Self {
            frame_type: FrameType::Cleared,
            frame_subtype: FrameSubtype::Cleared,
            nac: 0,
            last_src: 0,
            last_tg: 0,
            err_str: String::new(),
            slot0: SlotActivity::Idle,
            slot1: SlotActivity::Idle,
            alg_id: Self::ALG_ID_CLEARED.to_string(),
            key_id: Self::KEY_ID_CLEARED.to_string(),
        }
    }

    /// Reset everything after carrier loss
    pub fn clear(&mut self) {
        self.frame_type = FrameType::Cleared;
        self.frame_subtype = FrameSubtype::Cleared;
        self.nac = 0;
        self.last_src = 0;
        self.last_tg = 0;
        self.err_str.clear();
        self.slot0 = SlotActivity::Idle;
        self.slot1 = SlotActivity::Idle;
        self.alg_id.clear();
        self.alg_id.push_str(Self::ALG_ID_CLEARED);
        self.key_id.clear();
        self.key_id.push_str(Self::KEY_ID_CLEARED);
    }

    /// Reset the per-call identifiers at frame start
    pub fn clear_call(&mut self) {
        self.nac = 0;
        self.last_src = 0;
        self.last_tg = 0;
    }

    pub fn slot0_light(&self) -> &'static str {
        self.slot0.light(0)
    }

    pub fn slot1_light(&self) -> &'static str {
        self.slot1.light(1)
    }
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-symbol context handed to a processor
#[derive(Debug)]
pub struct FrameContext<'a> {
    pub symbol: i32,
    pub dibit: Dibit,
    pub info: &'a mut FrameInfo,
}

/// Capability set of a protocol frame processor.
///
/// `init` seeds per-frame state without consuming a symbol and may be called
/// repeatedly; `process` consumes exactly the one symbol in the context.
pub trait FrameProcessor {
    fn init(&mut self, info: &mut FrameInfo);
    fn process(&mut self, ctx: &mut FrameContext<'_>) -> FrameEvent;
}
