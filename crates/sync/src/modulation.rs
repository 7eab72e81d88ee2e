//! C4FM / QPSK / GFSK auto-selection
//!
//! The discriminator is the zero-crossing count of the input over a
//! 24-symbol window: QPSK flips most, GFSK sits in a fixed middle band, and
//! C4FM flips least. A winner whose optimisation is disabled leaves the
//! current modulation unchanged.

use serde::{Deserialize, Serialize};

/// Flip count above which GFSK is assumed (QPSK boundary is configurable)
pub const GFSK_FLIP_FLOOR: u32 = 18;
/// Symbols between modulation decisions
pub const DECISION_WINDOW: u32 = 24;

/// RF modulation scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Modulation {
    #[default]
    C4fm,
    Qpsk,
    Gfsk,
}

impl Modulation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modulation::C4fm => "C4FM",
            Modulation::Qpsk => "QPSK",
            Modulation::Gfsk => "GFSK",
        }
    }
}

/// Pick the modulation for the next window from the flip count.
///
/// `threshold` is the QPSK boundary; a disabled winner keeps `current`.
pub fn select(
    flips: u32,
    current: Modulation,
    threshold: u32,
    c4fm: bool,
    qpsk: bool,
    gfsk: bool,
) -> Modulation {
    if flips > threshold {
        if qpsk {
            Modulation::Qpsk
        } else {
            current
        }
    } else if flips > GFSK_FLIP_FLOOR {
        if gfsk {
            Modulation::Gfsk
        } else {
            current
        }
    } else if c4fm {
        Modulation::C4fm
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bands() {
        assert_eq!(select(40, Modulation::C4fm, 32, true, true, true), Modulation::Qpsk);
        assert_eq!(select(25, Modulation::C4fm, 32, true, true, true), Modulation::Gfsk);
        assert_eq!(select(5, Modulation::Qpsk, 32, true, true, true), Modulation::C4fm);
    }

    #[test]
    fn test_boundaries() {
        // exactly at the QPSK threshold stays below it
        assert_eq!(select(32, Modulation::C4fm, 32, true, true, true), Modulation::Gfsk);
        // exactly at the GFSK floor falls to C4FM
        assert_eq!(select(18, Modulation::Qpsk, 32, true, true, true), Modulation::C4fm);
    }

    #[test]
    fn test_disabled_winner_keeps_current() {
        assert_eq!(select(40, Modulation::Gfsk, 32, true, false, true), Modulation::Gfsk);
        assert_eq!(select(25, Modulation::Qpsk, 32, true, true, false), Modulation::Qpsk);
        assert_eq!(select(5, Modulation::Gfsk, 32, false, true, true), Modulation::Gfsk);
    }
}
