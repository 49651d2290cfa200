//! Configuration constants.
//!
//! This module defines the constants used throughout the application, including
//! timeouts, concurrency caps, output markers and pacing defaults.

use std::time::Duration;

/// Upper bound on concurrent link probes inside one validation batch.
///
/// Applied on top of the configured worker count, so a misconfigured
/// `--validation-workers 500` still probes at most this many links at once.
pub const VALIDATION_HARD_CAP: usize = 8;

/// Default wall-clock budget for one validation batch.
pub const DEFAULT_VALIDATION_DEADLINE: Duration = Duration::from_secs(30);

/// Default per-probe timeout in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 2;

/// Bytes of a playlist body inspected when probing `.m3u8` links.
pub const PROBE_READ_LIMIT: usize = 5 * 1024;

/// Default ceiling on concurrent network operations for a whole run
/// (search pages and link probes combined).
pub const DEFAULT_MAX_NETWORK_OPS: usize = 16;

/// Interval between progress log lines, in seconds.
pub const LOGGING_INTERVAL: u64 = 5;

// Search request pacing
/// Minimum spacing between two search requests sent to the same site.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(3);
/// Default random delay range (seconds) added before each search request.
pub const DEFAULT_REQUEST_DELAY: (f64, f64) = (1.0, 3.0);
/// Default random delay range (seconds) between channels in serial mode.
pub const DEFAULT_CHANNEL_DELAY: (f64, f64) = (2.0, 5.0);
/// Longest delay or interval, in seconds, accepted from the command line.
pub const MAX_DELAY_SECS: f64 = 3600.0;

// Batch run defaults
//
// A whole-list batch run asks for fewer links per channel than a searcher
// built directly (see `SearchConfig::default`), since it touches hundreds of
// channels against one portal.
/// Links kept per channel in a batch run.
pub const BATCH_MAX_RESULTS: usize = 8;
/// Valid links per channel after which a batch run stops searching.
pub const BATCH_MIN_VALID_LINKS: usize = 3;
/// Concurrent probes per validation batch in a batch run.
pub const BATCH_VALIDATION_WORKERS: usize = 4;

// Retry strategy
/// Initial delay in milliseconds before the first retry of a search page.
pub const RETRY_INITIAL_DELAY_MS: u64 = 2000;
/// Factor by which retry delay is multiplied on each attempt.
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds.
pub const RETRY_MAX_DELAY_SECS: u64 = 30;
/// Default number of attempts (initial + retries) for one search page.
pub const DEFAULT_MAX_RETRIES: usize = 4;

/// Search result pages shorter than this are treated as anti-bot stubs.
pub const MIN_SEARCH_PAGE_LENGTH: usize = 10_000;

/// Shortest string that can be a usable stream URL (`http://a.b` is 10).
pub const MIN_STREAM_URL_LENGTH: usize = 10;

// Output format
/// Suffix written after a group name to mark a group header row.
pub const GROUP_HEADER_MARKER: &str = "#genre#";
/// URL used by the timestamp row when no valid link was found anywhere.
pub const PLACEHOLDER_URL: &str = "http://placeholder.example/timestamp.m3u8";
/// Label of the synthetic timestamp row; `{}` is replaced by the formatted time.
pub const TIMESTAMP_LABEL_TEMPLATE: &str = "更新时间({})";
/// Timestamp format used in the label.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Offset of the timestamp label from UTC, in hours (Beijing time).
pub const TIMESTAMP_UTC_OFFSET_HOURS: i32 = 8;

// Input format
/// Character that introduces a group line in the channel list.
pub const GROUP_LINE_MARKER: char = '#';
/// Group used for channel lines that appear before any group line.
pub const DEFAULT_GROUP_NAME: &str = "Default";
/// Input file names tried when the configured input does not exist.
pub const DEFAULT_INPUT_FALLBACKS: &[&str] = &["LiveChannel.txt", "livechannel.txt"];

/// Searcher used when the configured one cannot be created.
pub const DEFAULT_SEARCHER: &str = "tonkiang";

/// Default User-Agent string for HTTP requests.
///
/// Only used when a searcher is built without user-agent rotation; the
/// built-in searchers pick from the pools in `user_agent`.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
pub const HTTP_STATUS_SERVICE_UNAVAILABLE: u16 = 503;
