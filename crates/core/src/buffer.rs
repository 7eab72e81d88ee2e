//! Dibit classification and the fixed-capacity rolling buffers

use crate::{CoreError, Result};

/// Dibit characters used for pattern matching
pub const DIBIT_CHAR_POSITIVE: u8 = b'1';
pub const DIBIT_CHAR_NEGATIVE: u8 = b'3';

/// Slots reserved at the base of the dibit history
pub const DIBIT_HISTORY_BASE: usize = 200;
/// Write index past which the dibit history rewinds to its base
pub const DIBIT_HISTORY_WRAP: usize = 900_000;
/// Total capacity of the dibit history ring
pub const DIBIT_HISTORY_LEN: usize = DIBIT_HISTORY_BASE + DIBIT_HISTORY_WRAP;

/// Unwritten headroom at the base of the sync-test window
pub const SYNC_WINDOW_HEADROOM: usize = 10;
/// Search position at which the sync-test window rewinds
pub const SYNC_SEARCH_LIMIT: u32 = 10_200;
/// Total capacity of the sync-test window
pub const SYNC_WINDOW_LEN: usize = 10_224;

/// Sign class of one received symbol.
///
/// At the sync-search layer only the sign of a symbol matters; a positive
/// symbol matches against pattern character `'1'`, a negative one against
/// `'3'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dibit {
    Positive,
    Negative,
}

impl Dibit {
    /// Classify a sliced symbol amplitude
    pub fn from_symbol(symbol: i32) -> Self {
        if symbol > 0 {
            Dibit::Positive
        } else {
            Dibit::Negative
        }
    }

    /// Pattern character used by the sync matcher
    pub fn as_char(self) -> u8 {
        match self {
            Dibit::Positive => DIBIT_CHAR_POSITIVE,
            Dibit::Negative => DIBIT_CHAR_NEGATIVE,
        }
    }

    /// Raw value stored in the dibit history
    pub fn value(self) -> u8 {
        match self {
            Dibit::Positive => 1,
            Dibit::Negative => 3,
        }
    }
}

/// Long trail of received dibits.
///
/// Preallocated ring consumed by the frame processors. Writes start at a
/// 200-slot base offset; once the write index passes the wrap threshold it
/// rewinds to the base, so the first 200 slots always hold the oldest
/// retained context.
#[derive(Debug, Clone)]
pub struct DibitHistory {
    buf: Vec<u8>,
    idx: usize,
}

impl DibitHistory {
    /// Create a history ring with the standard capacity
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; DIBIT_HISTORY_LEN],
            idx: DIBIT_HISTORY_BASE,
        }
    }

    /// Create a history ring with a custom capacity (tests, small hosts)
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity < DIBIT_HISTORY_BASE + 1 {
            return Err(CoreError::CapacityTooSmall {
                required: DIBIT_HISTORY_BASE + 1,
                requested: capacity,
            });
        }

        Ok(Self {
            buf: vec![0u8; capacity],
            idx: DIBIT_HISTORY_BASE,
        })
    }

    /// Append one dibit, rewinding past the wrap threshold
    pub fn push(&mut self, dibit: Dibit) {
        let wrap = DIBIT_HISTORY_WRAP.min(self.buf.len() - 1);

        if self.idx > wrap {
            self.idx = DIBIT_HISTORY_BASE;
        }

        self.buf[self.idx] = dibit.value();
        self.idx += 1;
    }

    /// Current write index
    pub fn position(&self) -> usize {
        self.idx
    }

    /// The `n` most recent dibit values, oldest first
    pub fn recent(&self, n: usize) -> &[u8] {
        let n = n.min(self.idx);
        &self.buf[self.idx - n..self.idx]
    }

    /// Zero the base slots and rewind the write index.
    ///
    /// Called on carrier loss; retained data forward of the base is left in
    /// place and simply overwritten as new dibits arrive.
    pub fn reset(&mut self) {
        for slot in &mut self.buf[..DIBIT_HISTORY_BASE] {
            *slot = 0;
        }
        self.idx = DIBIT_HISTORY_BASE;
    }
}

impl Default for DibitHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling dibit-character window scanned by the sync matcher.
///
/// Each received symbol appends one `'1'`/`'3'` character; the matcher reads
/// the trailing 18, 24, or 32 characters. The search position is bounded by
/// [`SYNC_SEARCH_LIMIT`]; reaching the limit rewinds the window, which the
/// caller must treat as carrier loss. `tail()` only yields a window once
/// enough characters have been written since the last reset or rewind.
#[derive(Debug, Clone)]
pub struct SyncWindow {
    buf: Vec<u8>,
    head: usize,
    written: usize,
    pos: u32,
}

impl SyncWindow {
    /// Create a window with the standard capacity
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; SYNC_WINDOW_LEN],
            head: SYNC_WINDOW_HEADROOM,
            written: 0,
            pos: 0,
        }
    }

    /// Append one dibit character
    pub fn push(&mut self, ch: u8) {
        self.buf[self.head] = ch;
        self.head += 1;
        self.written += 1;
    }

    /// The trailing `len` characters, ending at the most recent push.
    ///
    /// Returns `None` until `len` characters have been written since the
    /// last reset or rewind.
    pub fn tail(&self, len: usize) -> Option<&[u8]> {
        if self.written < len {
            return None;
        }
        Some(&self.buf[self.head - len..self.head])
    }

    /// Fixed-size copy of the trailing characters for pattern comparison
    pub fn tail_array<const N: usize>(&self) -> Option<[u8; N]> {
        if self.written < N {
            return None;
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.head - N..self.head]);
        Some(out)
    }

    /// Current search position
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Advance the search position after an unmatched symbol.
    ///
    /// Returns `true` when the position hit [`SYNC_SEARCH_LIMIT`] and the
    /// window rewound; the caller must drop carrier.
    pub fn advance(&mut self) -> bool {
        if self.pos < SYNC_SEARCH_LIMIT {
            self.pos += 1;
            false
        } else {
            self.rewind();
            true
        }
    }

    /// Restart the search window
    pub fn reset(&mut self) {
        self.rewind();
    }

    fn rewind(&mut self) {
        self.head = SYNC_WINDOW_HEADROOM;
        self.written = 0;
        self.pos = 0;
    }
}

impl Default for SyncWindow {
    fn default() -> Self {
        Self::new()
    }
}
