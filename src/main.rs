//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `iptv_scout` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use iptv_scout::initialization::init_logger_with;
use iptv_scout::{run_batch, Config, SearcherRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    if config.list_searchers {
        for name in SearcherRegistry::with_builtin().list() {
            println!("{}", name);
        }
        return Ok(());
    }

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_batch(config).await {
        Ok(report) => {
            println!(
                "✅ Searched {} channel{} with {}: {} with links, {} rows written in {:.1}s",
                report.channels,
                if report.channels == 1 { "" } else { "s" },
                report.searcher,
                report.channels_with_links,
                report.links_written,
                report.elapsed_seconds
            );
            println!("Playlist saved in {}", report.output.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("iptv_scout error: {:#}", e);
            process::exit(1);
        }
    }
}
