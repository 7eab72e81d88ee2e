//! OpenLMR RX - decode digital voice syncs from a WAV recording

use anyhow::Result;
use clap::Parser;

use openlmr_tools::{Receiver, RxConfig};

fn main() -> Result<()> {
    let config = RxConfig::parse();

    let level = if config.quiet {
        tracing::Level::WARN
    } else if config.verbose > 0 {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut receiver = Receiver::new(config)?;
    let summary = receiver.decode_file()?;

    println!(
        "{} samples, {} frame syncs",
        summary.samples,
        summary.syncs.len()
    );
    for event in &summary.syncs {
        println!(
            "  {:>4}  code {:2}  {}",
            event.offset,
            event.code,
            event.frame_type.trim()
        );
    }

    Ok(())
}
