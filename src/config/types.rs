//! Configuration types and CLI options.
//!
//! This module defines the enums and structs used for command-line argument
//! parsing (`Config`) and the run-scoped configurations derived from it
//! (`SearchConfig`, `BatchConfig`).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    BATCH_MAX_RESULTS, BATCH_MIN_VALID_LINKS, BATCH_VALIDATION_WORKERS, DEFAULT_CHANNEL_DELAY,
    DEFAULT_MAX_NETWORK_OPS, DEFAULT_MAX_RETRIES, DEFAULT_PROBE_TIMEOUT_SECS,
    DEFAULT_REQUEST_DELAY, DEFAULT_SEARCHER, DEFAULT_VALIDATION_DEADLINE, MAX_DELAY_SECS,
    MIN_REQUEST_INTERVAL,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// What a probe does with a link that answers but downloads slower than
/// `min_speed_kbps`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SpeedPolicy {
    /// Log the slow link and accept it anyway
    LogOnly,
    /// Treat the slow link as invalid
    Reject,
}

/// Pass/fail thresholds applied by link probes.
///
/// A probe passes when the endpoint answers within `timeout` with an
/// acceptable status (and, for playlists, a playlist body). When
/// `min_speed_kbps` is non-zero, the measured download speed of the probed
/// body is compared against it and `speed_policy` decides the outcome.
#[derive(Clone, Debug)]
pub struct ProbePolicy {
    /// Per-probe timeout
    pub timeout: Duration,
    /// Minimum acceptable download speed in KB/s (0 disables the check)
    pub min_speed_kbps: u32,
    /// Outcome for links slower than `min_speed_kbps`
    pub speed_policy: SpeedPolicy,
    /// Accept links on IPv6 literal hosts whose probe failed to connect
    ///
    /// Many runners have no IPv6 route, so a connect failure says nothing
    /// about the stream itself.
    pub lenient_ipv6: bool,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            min_speed_kbps: 0,
            speed_policy: SpeedPolicy::LogOnly,
            lenient_ipv6: true,
        }
    }
}

/// Run-scoped parameters handed to a searcher.
///
/// Immutable once passed to a searcher. `min_valid_links <= max_results` is
/// expected but not enforced: with a larger `min_valid_links` the search
/// still stops at `max_results`.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Maximum links kept per channel
    pub max_results: usize,
    /// Timeout for one search request
    pub timeout: Duration,
    /// Minimum resolution height; candidates with a known lower height are skipped (0 = off)
    pub min_resolution: u32,
    /// Probe candidates before accepting them
    pub enable_validation: bool,
    /// Remember results per keyword for the searcher's lifetime
    pub enable_cache: bool,
    /// Maximum result pages requested per keyword
    pub max_pages: u32,
    /// Requested concurrent probes per validation batch
    pub concurrent_workers: usize,
    /// Valid links per channel after which searching stops
    pub min_valid_links: usize,
    /// Wall-clock budget of one validation batch
    pub validation_deadline: Duration,
    /// Probe thresholds
    pub probe: ProbePolicy,
    /// Random delay range in seconds before each search request
    pub request_delay: (f64, f64),
    /// Minimum spacing between two search requests to the same site
    pub min_request_interval: Duration,
    /// Attempts (initial + retries) for one search page
    pub max_retries: usize,
    /// Override of the site's base URL
    pub site_url: Option<String>,
    /// Search URL template with `{keyword}` and `{page}` placeholders
    pub search_url: Option<String>,
    /// Rotate mobile user agents instead of desktop ones
    pub mobile_mode: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            timeout: Duration::from_secs(30),
            min_resolution: 0,
            enable_validation: true,
            enable_cache: true,
            max_pages: 3,
            concurrent_workers: 6,
            min_valid_links: 5,
            validation_deadline: DEFAULT_VALIDATION_DEADLINE,
            probe: ProbePolicy::default(),
            request_delay: DEFAULT_REQUEST_DELAY,
            min_request_interval: MIN_REQUEST_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
            site_url: None,
            search_url: None,
            mobile_mode: false,
        }
    }
}

/// Parameters of the batch processor.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Concurrent channel searches within one group (1 = serial mode)
    pub max_workers_per_group: usize,
    /// Random delay range in seconds between channels in serial mode
    pub channel_delay: (f64, f64),
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers_per_group: 4,
            channel_delay: DEFAULT_CHANNEL_DELAY,
        }
    }
}

/// Library and command-line configuration.
///
/// Can be parsed from the command line (`Config::parse()`) or constructed
/// programmatically.
///
/// # Examples
///
/// ```no_run
/// use iptv_scout::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     input: PathBuf::from("LiveChannel.txt"),
///     min_valid_links: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "iptv_scout",
    about = "Searches IPTV portals for live streams of the listed channels and writes a ranked playlist."
)]
pub struct Config {
    /// Channel list to read
    #[arg(value_parser, default_value = "LiveChannel.txt")]
    pub input: PathBuf,

    /// Playlist file to write
    #[arg(short, long, value_parser, default_value = "result.txt")]
    pub output: PathBuf,

    /// Registered searcher to use
    #[arg(long, default_value = DEFAULT_SEARCHER)]
    pub searcher: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Maximum links kept per channel
    #[arg(long, default_value_t = BATCH_MAX_RESULTS)]
    pub max_results: usize,

    /// Valid links per channel after which searching stops
    #[arg(long, default_value_t = BATCH_MIN_VALID_LINKS)]
    pub min_valid_links: usize,

    /// Maximum result pages per channel
    #[arg(long, default_value_t = 3)]
    pub max_pages: u32,

    /// Search request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_seconds: u64,

    /// Minimum resolution height (0 = no limit, 720 = 720p+, 1080 = 1080p+)
    #[arg(long, default_value_t = 0)]
    pub min_resolution: u32,

    /// Accept parsed links without probing them
    #[arg(long)]
    pub no_validation: bool,

    /// Disable the per-keyword result cache
    #[arg(long)]
    pub no_cache: bool,

    /// Concurrent probes per validation batch
    #[arg(long, default_value_t = BATCH_VALIDATION_WORKERS)]
    pub validation_workers: usize,

    /// Wall-clock budget of one validation batch in seconds
    #[arg(long, default_value_t = 30)]
    pub validation_deadline_secs: u64,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_SECS)]
    pub probe_timeout_secs: u64,

    /// Minimum probe download speed in KB/s (0 = no check)
    #[arg(long, default_value_t = 0)]
    pub min_speed_kbps: u32,

    /// What to do with links slower than --min-speed-kbps
    #[arg(long, value_enum, default_value_t = SpeedPolicy::LogOnly)]
    pub speed_policy: SpeedPolicy,

    /// Concurrent channel searches per group (1 = serial with pacing delays)
    #[arg(long, default_value_t = 4)]
    pub max_workers_per_group: usize,

    /// Ceiling on concurrent network operations for the whole run
    #[arg(long, default_value_t = DEFAULT_MAX_NETWORK_OPS)]
    pub max_network_ops: usize,

    /// Minimum random delay between channels in serial mode (seconds)
    #[arg(long, default_value_t = DEFAULT_CHANNEL_DELAY.0)]
    pub channel_delay_min: f64,

    /// Maximum random delay between channels in serial mode (seconds)
    #[arg(long, default_value_t = DEFAULT_CHANNEL_DELAY.1)]
    pub channel_delay_max: f64,

    /// Minimum random delay before each search request (seconds)
    #[arg(long, default_value_t = DEFAULT_REQUEST_DELAY.0)]
    pub request_delay_min: f64,

    /// Maximum random delay before each search request (seconds)
    #[arg(long, default_value_t = DEFAULT_REQUEST_DELAY.1)]
    pub request_delay_max: f64,

    /// Minimum spacing between two search requests to the site (seconds)
    #[arg(long, default_value_t = MIN_REQUEST_INTERVAL.as_secs_f64())]
    pub min_request_interval_secs: f64,

    /// Attempts per search page (initial + retries)
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,

    /// Override the searcher's base URL
    #[arg(long)]
    pub site_url: Option<String>,

    /// Search URL template for the generic searcher, e.g.
    /// `https://portal.example/search?q={keyword}&page={page}`
    #[arg(long)]
    pub search_url: Option<String>,

    /// Rotate mobile user agents
    #[arg(long)]
    pub mobile_mode: bool,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Print the registered searchers and exit
    #[arg(long)]
    pub list_searchers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("LiveChannel.txt"),
            output: PathBuf::from("result.txt"),
            searcher: DEFAULT_SEARCHER.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            max_results: BATCH_MAX_RESULTS,
            min_valid_links: BATCH_MIN_VALID_LINKS,
            max_pages: 3,
            timeout_seconds: 30,
            min_resolution: 0,
            no_validation: false,
            no_cache: false,
            validation_workers: BATCH_VALIDATION_WORKERS,
            validation_deadline_secs: DEFAULT_VALIDATION_DEADLINE.as_secs(),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            min_speed_kbps: 0,
            speed_policy: SpeedPolicy::LogOnly,
            max_workers_per_group: 4,
            max_network_ops: DEFAULT_MAX_NETWORK_OPS,
            channel_delay_min: DEFAULT_CHANNEL_DELAY.0,
            channel_delay_max: DEFAULT_CHANNEL_DELAY.1,
            request_delay_min: DEFAULT_REQUEST_DELAY.0,
            request_delay_max: DEFAULT_REQUEST_DELAY.1,
            min_request_interval_secs: MIN_REQUEST_INTERVAL.as_secs_f64(),
            max_retries: DEFAULT_MAX_RETRIES,
            site_url: None,
            search_url: None,
            mobile_mode: false,
            summary_json: None,
            list_searchers: false,
        }
    }
}

impl Config {
    /// Builds the searcher configuration for this run.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            max_results: self.max_results,
            timeout: Duration::from_secs(self.timeout_seconds),
            min_resolution: self.min_resolution,
            enable_validation: !self.no_validation,
            enable_cache: !self.no_cache,
            max_pages: self.max_pages,
            concurrent_workers: self.validation_workers,
            min_valid_links: self.min_valid_links,
            validation_deadline: Duration::from_secs(self.validation_deadline_secs),
            probe: ProbePolicy {
                timeout: Duration::from_secs(self.probe_timeout_secs),
                min_speed_kbps: self.min_speed_kbps,
                speed_policy: self.speed_policy,
                lenient_ipv6: true,
            },
            request_delay: ordered_range(self.request_delay_min, self.request_delay_max),
            min_request_interval: Duration::from_secs_f64(
                ordered_range(self.min_request_interval_secs, 0.0).1,
            ),
            max_retries: self.max_retries.max(1),
            site_url: self.site_url.clone(),
            search_url: self.search_url.clone(),
            mobile_mode: self.mobile_mode,
        }
    }

    /// Builds the batch processor configuration for this run.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            max_workers_per_group: self.max_workers_per_group.max(1),
            channel_delay: ordered_range(self.channel_delay_min, self.channel_delay_max),
        }
    }
}

/// Clamps a user-supplied delay range to ordered bounds within
/// `0..=MAX_DELAY_SECS`.
fn ordered_range(min: f64, max: f64) -> (f64, f64) {
    let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, MAX_DELAY_SECS) } else { 0.0 };
    let (min, max) = (clamp(min), clamp(max));
    if min <= max {
        (min, max)
    } else {
        (max, min)
    }
}
