//! Receiver configuration and implementation

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

use openlmr_decoder::decoder::{Decoder, FsmState};
use openlmr_decoder::options::{DecoderOptions, ModulationPreset};

/// Receiver configuration
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "lmr-rx")]
#[command(about = "OpenLMR receiver tool")]
pub struct RxConfig {
    /// Input file path (16-bit PCM WAV)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Samples per symbol (10 for 4800 baud, 20 for 2400 baud NXDN)
    #[arg(long, default_value = "10")]
    pub samples_per_symbol: u32,

    /// Modulation optimisations: auto, c4fm, qpsk or gfsk
    #[arg(long, default_value = "auto")]
    pub modulation: String,

    /// Enable D-STAR decoding
    #[arg(long)]
    pub dstar: bool,

    /// Enable NXDN48 (2400 baud) decoding
    #[arg(long)]
    pub nxdn48: bool,

    /// Enable NXDN96 (4800 baud) decoding
    #[arg(long)]
    pub nxdn96: bool,

    /// Enable ProVoice decoding
    #[arg(long)]
    pub provoice: bool,

    /// Expect inverted DMR signals
    #[arg(long)]
    pub inverted_dmr: bool,

    /// Expect inverted X2-TDMA signals
    #[arg(long)]
    pub inverted_x2tdma: bool,

    /// Show the symbol amplitude datascope
    #[arg(long)]
    pub datascope: bool,

    /// Datascope frame rate in frames per second
    #[arg(long, default_value = "15")]
    pub scope_rate: u32,

    /// Audio output gain (0 = auto)
    #[arg(long, default_value = "0")]
    pub gain: f32,

    /// Suppress sync announcements
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    #[serde(default)]
    pub verbose: u8,
}

impl Default for RxConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.wav"),
            samples_per_symbol: 10,
            modulation: "auto".to_string(),
            dstar: false,
            nxdn48: false,
            nxdn96: false,
            provoice: false,
            inverted_dmr: false,
            inverted_x2tdma: false,
            datascope: false,
            scope_rate: 15,
            gain: 0.0,
            quiet: false,
            verbose: 0,
        }
    }
}

impl RxConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }
}

/// One confirmed frame sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    pub code: i32,
    pub offset: u32,
    pub frame_type: String,
}

/// Result of a decoding run
#[derive(Debug, Clone, Default)]
pub struct RxSummary {
    pub samples: u64,
    pub syncs: Vec<SyncEvent>,
}

/// OpenLMR receiver
pub struct Receiver {
    config: RxConfig,
    decoder: Decoder,
    was_sync_found: bool,
}

impl Receiver {
    /// Create a new receiver with the given configuration
    pub fn new(config: RxConfig) -> Result<Self> {
        let preset = match config.modulation.as_str() {
            "auto" => ModulationPreset::Auto,
            "c4fm" => ModulationPreset::C4fm,
            "qpsk" => ModulationPreset::Qpsk,
            "gfsk" => ModulationPreset::Gfsk,
            other => anyhow::bail!("Unsupported modulation optimisation: {}", other),
        };

        let opts = DecoderOptions {
            frame_dstar: config.dstar,
            frame_nxdn48: config.nxdn48,
            frame_nxdn96: config.nxdn96,
            frame_provoice: config.provoice,
            inverted_dmr: config.inverted_dmr,
            inverted_x2tdma: config.inverted_x2tdma,
            ..DecoderOptions::default()
        };

        let mut decoder = Decoder::with_options(opts);
        decoder.set_samples_per_symbol(config.samples_per_symbol);
        decoder.set_modulation_optimizations(preset);
        decoder.set_audio_gain(config.gain);

        if config.datascope {
            decoder.set_datascope_frame_rate(config.scope_rate);
        } else if config.quiet {
            decoder.set_quiet();
        } else {
            decoder.set_verbosity(config.verbose as u32 + 1);
        }

        Ok(Self {
            config,
            decoder,
            was_sync_found: false,
        })
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Feed a block of samples, collecting confirmed syncs
    pub fn process(&mut self, samples: &[i16], summary: &mut RxSummary) {
        for &sample in samples {
            self.decoder.run(sample);
            summary.samples += 1;

            let sync_found = self.decoder.fsm_state() == FsmState::SyncFound;
            if sync_found && !self.was_sync_found {
                let event = SyncEvent {
                    code: self.decoder.last_sync_code(),
                    offset: self.decoder.sync_offset(),
                    frame_type: self.decoder.frame_info().frame_type.label().to_string(),
                };
                info!(
                    code = event.code,
                    offset = event.offset,
                    "sync: {}",
                    event.frame_type.trim()
                );
                summary.syncs.push(event);
            }
            self.was_sync_found = sync_found;
        }
    }

    /// Decode the configured WAV file
    pub fn decode_file(&mut self) -> Result<RxSummary> {
        let mut reader = hound::WavReader::open(&self.config.input)
            .with_context(|| format!("Failed to open input file: {:?}", self.config.input))?;

        let spec = reader.spec();
        if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
            anyhow::bail!(
                "Expected 16-bit integer PCM, got {}-bit {:?}",
                spec.bits_per_sample,
                spec.sample_format
            );
        }

        let channels = spec.channels as usize;
        let mut summary = RxSummary::default();
        let mut block: Vec<i16> = Vec::with_capacity(4096);

        for (i, sample) in reader.samples::<i16>().enumerate() {
            // first channel only
            if i % channels != 0 {
                continue;
            }
            block.push(sample?);
            if block.len() == 4096 {
                self.process(&block, &mut summary);
                block.clear();
            }
        }
        self.process(&block, &mut summary);

        info!(
            samples = summary.samples,
            syncs = summary.syncs.len(),
            "decode finished"
        );
        Ok(summary)
    }
}
