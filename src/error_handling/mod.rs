//! Error handling and run statistics.
//!
//! This module provides:
//! - Error type definitions (initialization, searcher lookup, page fetch, channel records)
//! - Run statistics tracking (errors, warnings, info metrics)
//! - Fetch error categorization and the retry backoff schedule
//!
//! Counters are categorized into:
//! - **Errors**: failures that cost a page, a probe or a channel its results
//! - **Warnings**: degraded results that do not stop the run
//! - **Info**: informational metrics (cache hits, early stops, etc.)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_fetch_error, get_retry_strategy, update_error_stats};
pub use stats::{ProcessingStats, StatsSnapshot};
pub use types::{
    ChannelError, ErrorType, FetchError, InfoType, InitializationError, SearcherError,
    WarningType,
};
