//! ASCII datascope
//!
//! Tuning aid: a 64-bucket histogram of the current symbol amplitude window
//! rendered as a 10-row plot, with markers for the tracked min, max, and
//! centre levels and a rule at the zero column. Pure output; the decoder
//! resets its symbol counter when a frame is emitted and nothing else
//! changes.

use openlmr_protocols::common::FrameInfo;

/// Histogram buckets across the 16-bit amplitude range
pub const SPECTRUM_BUCKETS: usize = 64;
/// Amplitude span of one bucket
pub const SCOPE_BUCKET_WIDTH: i32 = 1024;
/// Offset mapping signed amplitudes onto the bucket axis
pub const SCOPE_CENTER_OFFSET: i32 = 32_768;
/// Symbol rate used to derive the frame cadence from the scope rate
pub const SCOPE_SYMBOL_RATE: u32 = 4_800;
/// Plot height in rows
pub const SCOPE_ROWS: usize = 10;

fn bucket(value: i32) -> usize {
    (((value + SCOPE_CENTER_OFFSET) / SCOPE_BUCKET_WIDTH) as usize).min(SPECTRUM_BUCKETS - 1)
}

/// Amplitude histogram and plot renderer
#[derive(Debug, Clone)]
pub struct Datascope {
    spectrum: [u32; SPECTRUM_BUCKETS],
}

impl Datascope {
    pub fn new() -> Self {
        Self {
            spectrum: [0; SPECTRUM_BUCKETS],
        }
    }

    pub fn spectrum(&self) -> &[u32; SPECTRUM_BUCKETS] {
        &self.spectrum
    }

    /// Rebuild the histogram from a sorted amplitude window
    pub fn update(&mut self, window: &[i32]) {
        self.spectrum = [0; SPECTRUM_BUCKETS];
        for &value in window {
            self.spectrum[bucket(value)] += 1;
        }
    }

    /// Render the status panel and plot
    pub fn render(
        &self,
        modulation: &str,
        info: &FrameInfo,
        min: i32,
        max: i32,
        center: i32,
    ) -> String {
        let mut out = String::with_capacity(1024);

        out.push_str(&format!(
            "Demod mode:     {}                Nac:                     {:4X}\n",
            modulation, info.nac
        ));
        out.push_str(&format!(
            "Frame Type:    {}        Talkgroup:            {:7}\n",
            info.frame_type.label(),
            info.last_tg
        ));
        out.push_str(&format!(
            "Frame Subtype: {}       Source:          {:12}\n",
            info.frame_subtype.label(),
            info.last_src
        ));
        out.push_str(&format!(
            "TDMA activity:  {} {}     Voice errors: {}\n",
            info.slot0_light(),
            info.slot1_light(),
            info.err_str
        ));

        let border = format!("+{}+\n", "-".repeat(SPECTRUM_BUCKETS));
        out.push_str(&border);

        let min_col = bucket(min);
        let max_col = bucket(max);
        let center_col = bucket(center);

        for row in 0..SCOPE_ROWS {
            out.push('|');
            for col in 0..SPECTRUM_BUCKETS {
                let ch = if row == 0 {
                    if col == min_col || col == max_col {
                        '#'
                    } else if col == center_col {
                        '!'
                    } else if col == SPECTRUM_BUCKETS / 2 {
                        '|'
                    } else {
                        ' '
                    }
                } else if self.spectrum[col] as usize > SCOPE_ROWS - 1 - row {
                    '*'
                } else if col == SPECTRUM_BUCKETS / 2 {
                    '|'
                } else {
                    ' '
                };
                out.push(ch);
            }
            out.push_str("|\n");
        }

        out.push_str(&border);
        out
    }
}

impl Default for Datascope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_buckets() {
        let mut scope = Datascope::new();
        scope.update(&[0, 0, 0, -32_768, 32_767]);
        assert_eq!(scope.spectrum()[32], 3);
        assert_eq!(scope.spectrum()[0], 1);
        assert_eq!(scope.spectrum()[63], 1);
    }

    #[test]
    fn test_render_shape() {
        let mut scope = Datascope::new();
        let window: Vec<i32> = (0..24).map(|i| (i - 12) * 1_000).collect();
        scope.update(&window);

        let info = FrameInfo::new();
        let plot = scope.render("C4FM", &info, -12_000, 11_000, 0);
        let lines: Vec<&str> = plot.lines().collect();

        // 4 header lines, 2 borders, 10 plot rows
        assert_eq!(lines.len(), 16);
        for line in &lines[4..] {
            assert_eq!(line.len(), SPECTRUM_BUCKETS + 2);
        }
        // marker row carries min/max/centre marks
        assert!(lines[5].contains('#'));
        assert!(lines[5].contains('!'));
        // densest buckets rise to the top rows
        assert!(plot.contains('*'));
    }
}
