//! iptv_scout library: live-stream search and validation for IPTV playlists
//!
//! This library reads a grouped list of TV channel names, searches a
//! registered site plugin for live-stream links to each channel, validates
//! candidate links with bounded concurrency and early exit, ranks each
//! channel's links by how often their host recurs across the whole result
//! set, and writes a `name,url` playlist.
//!
//! # Example
//!
//! ```no_run
//! use iptv_scout::{run_batch, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     input: std::path::PathBuf::from("LiveChannel.txt"),
//!     min_valid_links: 3,
//!     ..Default::default()
//! };
//!
//! let report = run_batch(config).await?;
//! println!(
//!     "{} of {} channels have links, {} rows written",
//!     report.channels_with_links, report.channels, report.links_written
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod batch;
pub mod channel;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod playlist;
pub mod ranking;
pub mod searcher;
mod user_agent;
mod utils;
pub mod validation;

// Re-export public API
pub use batch::{AggregateResults, BatchProcessor, ChannelResult, GroupResult};
pub use channel::{Channel, ChannelGroup, QualityTier};
pub use config::{BatchConfig, Config, LogFormat, LogLevel, SearchConfig};
pub use error_handling::{FetchError, SearcherError};
pub use run::{run_batch, run_batch_with, BatchReport};
pub use searcher::{ChannelSearcher, SearchContext, Searcher, SearcherRegistry, SiteInfo};

// Internal run module (contains the batch orchestration)
mod run {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Instant;

    use anyhow::{bail, Context, Result};
    use chrono::Utc;
    use log::{info, warn};
    use serde::Serialize;
    use tokio_util::sync::CancellationToken;

    use crate::app::{log_progress, print_error_statistics, print_summary, shutdown_gracefully};
    use crate::batch::BatchProcessor;
    use crate::config::{Config, DEFAULT_INPUT_FALLBACKS, DEFAULT_SEARCHER, LOGGING_INTERVAL};
    use crate::error_handling::{InfoType, StatsSnapshot};
    use crate::playlist::{format_playlist, read_channel_file, timestamp_label, write_playlist};
    use crate::ranking::DomainFrequency;
    use crate::searcher::{ChannelSearcher, SearchContext, SearcherRegistry};

    /// Results of a batch run.
    #[derive(Debug, Clone, Serialize)]
    pub struct BatchReport {
        /// Groups read from the channel list
        pub groups: usize,
        /// Channels read from the channel list
        pub channels: usize,
        /// Channels for which at least one link was found
        pub channels_with_links: usize,
        /// `name,url` rows written, the timestamp row included
        pub links_written: usize,
        /// Playlist path
        pub output: PathBuf,
        /// Searcher that served the run (after any fallback)
        pub searcher: String,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
        /// Non-zero error, warning and info counters
        pub stats: StatsSnapshot,
    }

    /// Runs a batch with the built-in searchers.
    ///
    /// # Errors
    ///
    /// Fails when no channel list can be read, when neither the configured
    /// searcher nor the default one can be created, or when the playlist (or
    /// JSON summary) cannot be written. Search and probe failures never fail
    /// the run; they only shrink the output.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use iptv_scout::{run_batch, Config};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let report = run_batch(Config::default()).await?;
    /// println!("Wrote {}", report.output.display());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_batch(config: Config) -> Result<BatchReport> {
        run_batch_with(config, &SearcherRegistry::with_builtin()).await
    }

    /// Runs a batch with searchers looked up in `registry`.
    pub async fn run_batch_with(config: Config, registry: &SearcherRegistry) -> Result<BatchReport> {
        let start_time = Instant::now();

        let input = resolve_input(&config.input)?;
        let groups = read_channel_file(&input).await?;
        let total_channels: usize = groups.iter().map(|g| g.channels.len()).sum();
        if groups.is_empty() {
            warn!("No channels found in {}", input.display());
        }

        let ctx = SearchContext::new(config.max_network_ops);
        let (searcher, searcher_name) =
            create_searcher(registry, &config, ctx.clone()).await?;
        let site = searcher.site_info();
        info!("Using searcher {} ({}): {}", site.name, site.url, site.description);

        let processor = BatchProcessor::new(Arc::new(searcher), config.batch_config());

        let cancel = CancellationToken::new();
        let cancel_logging = cancel.child_token();
        let completed_for_logging = processor.completed_channels();
        let logging_task = Some(tokio::task::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(LOGGING_INTERVAL));
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        log_progress(start_time, &completed_for_logging, total_channels);
                    }
                    _ = cancel_logging.cancelled() => {
                        break;
                    }
                }
            }
        }));

        let mut results = processor.process_all_groups(&groups).await;

        shutdown_gracefully(cancel, logging_task).await;
        log_progress(start_time, &processor.completed_channels(), total_channels);

        let frequency = DomainFrequency::collect(&results);
        frequency.rank_results(&mut results);

        let playlist = format_playlist(&results, &timestamp_label(Utc::now()));
        write_playlist(&config.output, &playlist).await?;

        let report = BatchReport {
            groups: groups.len(),
            channels: total_channels,
            channels_with_links: results.channels_with_links(),
            links_written: playlist.links,
            output: config.output.clone(),
            searcher: searcher_name,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
            stats: ctx.stats.snapshot(),
        };

        print_error_statistics(&ctx.stats);
        print_summary(
            report.channels,
            report.channels_with_links,
            report.links_written,
            &report.output,
            report.elapsed_seconds,
        );

        if let Some(path) = &config.summary_json {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize run summary")?;
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write run summary: {}", path.display()))?;
        }

        Ok(report)
    }

    /// Picks the channel list: the configured path if it exists, otherwise the
    /// first existing default name.
    fn resolve_input(configured: &Path) -> Result<PathBuf> {
        if configured.exists() {
            return Ok(configured.to_path_buf());
        }
        for candidate in DEFAULT_INPUT_FALLBACKS {
            let candidate = PathBuf::from(candidate);
            if candidate.exists() {
                warn!(
                    "{} not found, using {}",
                    configured.display(),
                    candidate.display()
                );
                return Ok(candidate);
            }
        }
        bail!(
            "Channel list not found: {} (also tried {})",
            configured.display(),
            DEFAULT_INPUT_FALLBACKS.join(", ")
        )
    }

    /// Creates the configured searcher, falling back once to the default one.
    async fn create_searcher(
        registry: &SearcherRegistry,
        config: &Config,
        ctx: SearchContext,
    ) -> Result<(ChannelSearcher, String)> {
        let search_config = config.search_config();
        match registry
            .create(&config.searcher, search_config.clone(), ctx.clone())
            .await
        {
            Ok(searcher) => Ok((searcher, config.searcher.clone())),
            Err(e) if config.searcher != DEFAULT_SEARCHER => {
                warn!(
                    "Failed to create searcher '{}': {}. Falling back to '{}'",
                    config.searcher, e, DEFAULT_SEARCHER
                );
                ctx.stats.increment_info(InfoType::SearcherFallback);
                let searcher = registry
                    .create(DEFAULT_SEARCHER, search_config, ctx)
                    .await
                    .with_context(|| {
                        format!("Failed to create fallback searcher '{}'", DEFAULT_SEARCHER)
                    })?;
                Ok((searcher, DEFAULT_SEARCHER.to_string()))
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to create searcher '{}'", config.searcher)),
        }
    }
}
