//! Error categorization and retry strategy.
//!
//! This module maps search-page failures onto stats counters and builds the
//! backoff schedule used when a page request is retried.

use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};

use super::stats::ProcessingStats;
use super::types::{ErrorType, FetchError};
use crate::config::{HTTP_STATUS_SERVICE_UNAVAILABLE, HTTP_STATUS_TOO_MANY_REQUESTS};

/// Creates a jittered exponential backoff retry strategy.
///
/// `max_attempts` counts the initial request, so the iterator yields
/// `max_attempts - 1` delays. Each delay is drawn uniformly below the
/// exponential step (starting at `RETRY_INITIAL_DELAY_MS`, capped at
/// `RETRY_MAX_DELAY_SECS`) so parallel channels do not retry in lockstep.
pub fn get_retry_strategy(max_attempts: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .map(jitter)
        .take(max_attempts.saturating_sub(1))
}

/// Categorizes a failed search page request into an `ErrorType`.
pub fn categorize_fetch_error(error: &FetchError) -> ErrorType {
    match error {
        FetchError::Status(code) => categorize_status(*code),
        FetchError::ContentTooShort { .. } => ErrorType::SearchContentTooShort,
        FetchError::BudgetClosed => ErrorType::SearchRequestOther,
        FetchError::Http(e) => {
            if let Some(status) = e.status() {
                return categorize_status(status.as_u16());
            }
            if e.is_timeout() {
                ErrorType::SearchRequestTimeout
            } else if e.is_connect() {
                ErrorType::SearchRequestConnect
            } else {
                ErrorType::SearchRequestOther
            }
        }
    }
}

fn categorize_status(code: u16) -> ErrorType {
    match code {
        HTTP_STATUS_TOO_MANY_REQUESTS => ErrorType::SearchRequestTooManyRequests,
        HTTP_STATUS_SERVICE_UNAVAILABLE => ErrorType::SearchServiceUnavailable,
        _ => ErrorType::SearchRequestStatus,
    }
}

/// Records a failed search page request in the run statistics.
pub fn update_error_stats(stats: &ProcessingStats, error: &FetchError) {
    stats.increment_error(categorize_fetch_error(error));
}
