//! Sync pattern constants and the sync code enumeration
//!
//! Each protocol marks the start of a frame with a fixed symbol sequence.
//! The patterns are stored as dibit-character strings (`'1'` positive,
//! `'3'` negative) and compared character-for-character against the trailing
//! window of received symbols; a single mismatched character is a miss.

use crate::{Result, SyncError};

/// P25 Phase 1 frame sync (24 dibits)
pub const P25P1_SYNC: &[u8; 24] = b"111113113311333313133333";
pub const INV_P25P1_SYNC: &[u8; 24] = b"333331331133111131311111";

/// X2-TDMA base-station and mobile-station syncs (24 dibits)
pub const X2TDMA_BS_VOICE_SYNC: &[u8; 24] = b"113131333331313331113311";
pub const X2TDMA_BS_DATA_SYNC: &[u8; 24] = b"331313111113131113331133";
pub const X2TDMA_MS_DATA_SYNC: &[u8; 24] = b"313113333111111133333313";
pub const X2TDMA_MS_VOICE_SYNC: &[u8; 24] = b"131331111333333311111131";

/// DMR base-station and mobile-station syncs (24 dibits)
pub const DMR_BS_DATA_SYNC: &[u8; 24] = b"313333111331131131331131";
pub const DMR_BS_VOICE_SYNC: &[u8; 24] = b"131111333113313313113313";
pub const DMR_MS_DATA_SYNC: &[u8; 24] = b"311131133313133331131113";
pub const DMR_MS_VOICE_SYNC: &[u8; 24] = b"133313311131311113313331";

/// D-STAR voice sync and radio header preamble (24 dibits)
pub const DSTAR_SYNC: &[u8; 24] = b"313131313133131113313111";
pub const INV_DSTAR_SYNC: &[u8; 24] = b"131313131311313331131333";
pub const DSTAR_HD_SYNC: &[u8; 24] = b"131313131333133113131111";
pub const INV_DSTAR_HD_SYNC: &[u8; 24] = b"313131313111311331313333";

/// NXDN base-station and mobile-station syncs (18 dibits)
pub const NXDN_BS_VOICE_SYNC: &[u8; 18] = b"313133113131113113";
pub const INV_NXDN_BS_VOICE_SYNC: &[u8; 18] = b"131311331313331331";
pub const NXDN_MS_VOICE_SYNC: &[u8; 18] = b"313133113131113133";
pub const INV_NXDN_MS_VOICE_SYNC: &[u8; 18] = b"131311331313331311";
pub const NXDN_BS_DATA_SYNC: &[u8; 18] = b"313133113131111313";
pub const INV_NXDN_BS_DATA_SYNC: &[u8; 18] = b"131311331313333131";
pub const NXDN_MS_DATA_SYNC: &[u8; 18] = b"313133113131111333";
pub const INV_NXDN_MS_DATA_SYNC: &[u8; 18] = b"131311331313333111";

/// ProVoice standard and EA syncs (32 dibits)
pub const PROVOICE_SYNC: &[u8; 32] = b"13131333111311311133113311331133";
pub const INV_PROVOICE_SYNC: &[u8; 32] = b"31313111333133133311331133113311";
pub const PROVOICE_EA_SYNC: &[u8; 32] = b"13313133113113333311313133133311";
pub const INV_PROVOICE_EA_SYNC: &[u8; 32] = b"31131311331331111133131311311133";

/// Protocol family of a sync pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncFamily {
    P25Phase1,
    X2Tdma,
    Dmr,
    DStar,
    DStarHd,
    Nxdn,
    ProVoice,
}

/// Signal polarity of a matched sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Normal,
    Inverted,
}

/// Frame payload class announced by a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Voice,
    Data,
}

/// Identity of a matched sync pattern.
///
/// The numeric sync codes 0..=19 are kept for interoperability with external
/// logs; dispatch works on the tagged form. `code()` ignores `kind` for the
/// families whose sync does not distinguish voice from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncId {
    pub family: SyncFamily,
    pub polarity: Polarity,
    pub kind: FrameKind,
}

impl SyncId {
    pub const fn new(family: SyncFamily, polarity: Polarity, kind: FrameKind) -> Self {
        Self {
            family,
            polarity,
            kind,
        }
    }

    /// Numeric sync code as carried in logs and the dispatcher
    pub fn code(&self) -> i32 {
        use FrameKind::*;
        use Polarity::*;
        use SyncFamily::*;

        match (self.family, self.polarity, self.kind) {
            (P25Phase1, Normal, _) => 0,
            (P25Phase1, Inverted, _) => 1,
            (X2Tdma, Normal, Data) => 2,
            (X2Tdma, Inverted, Voice) => 3,
            (X2Tdma, Normal, Voice) => 4,
            (X2Tdma, Inverted, Data) => 5,
            (DStar, Normal, _) => 6,
            (DStar, Inverted, _) => 7,
            (Nxdn, Normal, Voice) => 8,
            (Nxdn, Inverted, Voice) => 9,
            (Dmr, Normal, Data) => 10,
            (Dmr, Inverted, Voice) => 11,
            (Dmr, Normal, Voice) => 12,
            (Dmr, Inverted, Data) => 13,
            (ProVoice, Normal, _) => 14,
            (ProVoice, Inverted, _) => 15,
            (Nxdn, Normal, Data) => 16,
            (Nxdn, Inverted, Data) => 17,
            (DStarHd, Normal, _) => 18,
            (DStarHd, Inverted, _) => 19,
        }
    }

    /// Recover the tagged form from a numeric sync code
    pub fn from_code(code: i32) -> Result<Self> {
        use FrameKind::*;
        use Polarity::*;
        use SyncFamily::*;

        let id = match code {
            0 => Self::new(P25Phase1, Normal, Voice),
            1 => Self::new(P25Phase1, Inverted, Voice),
            2 => Self::new(X2Tdma, Normal, Data),
            3 => Self::new(X2Tdma, Inverted, Voice),
            4 => Self::new(X2Tdma, Normal, Voice),
            5 => Self::new(X2Tdma, Inverted, Data),
            6 => Self::new(DStar, Normal, Voice),
            7 => Self::new(DStar, Inverted, Voice),
            8 => Self::new(Nxdn, Normal, Voice),
            9 => Self::new(Nxdn, Inverted, Voice),
            10 => Self::new(Dmr, Normal, Data),
            11 => Self::new(Dmr, Inverted, Voice),
            12 => Self::new(Dmr, Normal, Voice),
            13 => Self::new(Dmr, Inverted, Data),
            14 => Self::new(ProVoice, Normal, Voice),
            15 => Self::new(ProVoice, Inverted, Voice),
            16 => Self::new(Nxdn, Normal, Data),
            17 => Self::new(Nxdn, Inverted, Data),
            18 => Self::new(DStarHd, Normal, Data),
            19 => Self::new(DStarHd, Inverted, Data),
            _ => return Err(SyncError::UnknownSyncCode { code }),
        };

        Ok(id)
    }
}

/// Frame type shown in the status panel.
///
/// The `Resumed` variants mark a lock carried over from a previous sync of
/// the same family, rendered in parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameType {
    #[default]
    Cleared,
    P25Phase1,
    P25Phase1Resumed,
    X2Tdma,
    X2TdmaResumed,
    Dmr,
    DmrResumed,
    DStar,
    DStarHd,
    Nxdn48,
    Nxdn96,
    ProVoice,
}

impl FrameType {
    /// Fixed-width panel label
    pub fn label(&self) -> &'static str {
        match self {
            FrameType::Cleared => "             ",
            FrameType::P25Phase1 => " P25 Phase 1 ",
            FrameType::P25Phase1Resumed => "(P25 Phase 1)",
            FrameType::X2Tdma => " X2-TDMA     ",
            FrameType::X2TdmaResumed => "(X2-TDMA)    ",
            FrameType::Dmr => " DMR         ",
            FrameType::DmrResumed => "(DMR)        ",
            FrameType::DStar => " D-STAR      ",
            FrameType::DStarHd => " D-STAR_HD   ",
            FrameType::Nxdn48 => " NXDN48      ",
            FrameType::Nxdn96 => " NXDN96      ",
            FrameType::ProVoice => " ProVoice    ",
        }
    }
}

/// Frame subtype shown in the status panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameSubtype {
    #[default]
    Cleared,
    Voice,
    Data,
}

impl FrameSubtype {
    /// Fixed-width panel label
    pub fn label(&self) -> &'static str {
        match self {
            FrameSubtype::Cleared => "              ",
            FrameSubtype::Voice => " VOICE        ",
            FrameSubtype::Data => " DATA         ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inverted(pattern: &[u8]) -> Vec<u8> {
        pattern
            .iter()
            .map(|&c| if c == b'1' { b'3' } else { b'1' })
            .collect()
    }

    #[test]
    fn test_pattern_polarity_duality() {
        assert_eq!(inverted(P25P1_SYNC), INV_P25P1_SYNC.to_vec());
        assert_eq!(inverted(DSTAR_SYNC), INV_DSTAR_SYNC.to_vec());
        assert_eq!(inverted(DSTAR_HD_SYNC), INV_DSTAR_HD_SYNC.to_vec());
        assert_eq!(inverted(NXDN_BS_VOICE_SYNC), INV_NXDN_BS_VOICE_SYNC.to_vec());
        assert_eq!(inverted(NXDN_MS_VOICE_SYNC), INV_NXDN_MS_VOICE_SYNC.to_vec());
        assert_eq!(inverted(NXDN_BS_DATA_SYNC), INV_NXDN_BS_DATA_SYNC.to_vec());
        assert_eq!(inverted(NXDN_MS_DATA_SYNC), INV_NXDN_MS_DATA_SYNC.to_vec());
        assert_eq!(inverted(PROVOICE_SYNC), INV_PROVOICE_SYNC.to_vec());
        assert_eq!(inverted(PROVOICE_EA_SYNC), INV_PROVOICE_EA_SYNC.to_vec());
    }

    #[test]
    fn test_dmr_voice_is_inverse_of_data() {
        assert_eq!(inverted(DMR_BS_DATA_SYNC), DMR_BS_VOICE_SYNC.to_vec());
        assert_eq!(inverted(DMR_MS_DATA_SYNC), DMR_MS_VOICE_SYNC.to_vec());
        assert_eq!(inverted(X2TDMA_BS_DATA_SYNC), X2TDMA_BS_VOICE_SYNC.to_vec());
        assert_eq!(inverted(X2TDMA_MS_DATA_SYNC), X2TDMA_MS_VOICE_SYNC.to_vec());
    }

    #[test]
    fn test_sync_code_round_trip() {
        for code in 0..=19 {
            let id = SyncId::from_code(code).unwrap();
            assert_eq!(id.code(), code);
        }
        assert!(SyncId::from_code(20).is_err());
        assert!(SyncId::from_code(-1).is_err());
    }

    #[test]
    fn test_label_widths() {
        for ft in [
            FrameType::Cleared,
            FrameType::P25Phase1,
            FrameType::P25Phase1Resumed,
            FrameType::X2Tdma,
            FrameType::X2TdmaResumed,
            FrameType::Dmr,
            FrameType::DmrResumed,
            FrameType::DStar,
            FrameType::DStarHd,
            FrameType::Nxdn48,
            FrameType::Nxdn96,
            FrameType::ProVoice,
        ] {
            assert_eq!(ft.label().len(), 13);
        }
        for st in [FrameSubtype::Cleared, FrameSubtype::Voice, FrameSubtype::Data] {
            assert_eq!(st.label().len(), 14);
        }
    }
}
