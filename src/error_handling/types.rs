//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors raised while looking up or constructing a searcher.
///
/// These are configuration-level failures: they are surfaced immediately
/// instead of being degraded to "no results".
#[derive(Error, Debug)]
pub enum SearcherError {
    /// No searcher is registered under the requested name.
    #[error("searcher not found: {name} (registered searchers: {})", known.join(", "))]
    NotFound {
        /// Requested name
        name: String,
        /// Names that are registered
        known: Vec<String>,
    },

    /// The searcher rejected its configuration or failed to prepare its transport.
    #[error("searcher setup failed: {0}")]
    Setup(String),

    /// Building the searcher's HTTP client failed.
    #[error("searcher HTTP client error: {0}")]
    Client(#[from] ReqwestError),
}

/// Transport-level failure of one search page request.
///
/// Distinct from an empty-but-valid page, which is `Ok` content that parses
/// to zero candidates.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network or protocol failure reported by the HTTP client.
    #[error("request failed: {0}")]
    Http(#[from] ReqwestError),

    /// The site answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The site answered 200 with a body too short to be a result page
    /// (typically an anti-bot interstitial).
    #[error("response too short ({len} bytes)")]
    ContentTooShort {
        /// Body length in bytes
        len: usize,
    },

    /// The run-wide network budget was closed before the request started.
    #[error("network budget closed")]
    BudgetClosed,
}

/// Errors raised when a channel record cannot be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel name is empty or whitespace.
    #[error("channel name must not be empty")]
    EmptyName,

    /// The stream URL is empty or whitespace.
    #[error("channel URL must not be empty")]
    EmptyUrl,

    /// The stream URL does not parse.
    #[error("invalid channel URL '{0}'")]
    InvalidUrl(String),

    /// The stream URL uses a scheme players cannot open over the network.
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
}

/// Types of errors that can occur while searching and probing.
///
/// This enum categorizes actual error conditions: failures that cost a page
/// or a channel its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    SearchRequestTimeout,
    SearchRequestConnect,
    SearchRequestTooManyRequests,
    SearchServiceUnavailable,
    SearchRequestStatus,
    SearchContentTooShort,
    SearchRequestOther,
    ProbePanicked,
    ChannelTaskFailed,
}

/// Types of warnings that can occur while searching.
///
/// Warnings indicate degraded results that do not stop the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    ValidationShort,
    ValidationTimedOut,
    CandidateBelowMinResolution,
    ChannelWithoutLinks,
}

/// Types of informational metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    CacheHit,
    ValidationTargetMet,
    SearchStoppedEarly,
    SearcherFallback,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::SearchRequestTimeout => "Search request timeout",
            ErrorType::SearchRequestConnect => "Search request connect error",
            ErrorType::SearchRequestTooManyRequests => "Too many requests (429)",
            ErrorType::SearchServiceUnavailable => "Service Unavailable (503)",
            ErrorType::SearchRequestStatus => "Search request status error",
            ErrorType::SearchContentTooShort => "Search response too short",
            ErrorType::SearchRequestOther => "Search request other error",
            ErrorType::ProbePanicked => "Link probe panicked",
            ErrorType::ChannelTaskFailed => "Channel task failed",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::ValidationShort => "Validation short of target",
            WarningType::ValidationTimedOut => "Validation deadline reached",
            WarningType::CandidateBelowMinResolution => "Candidate below minimum resolution",
            WarningType::ChannelWithoutLinks => "Channel without valid links",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::CacheHit => "Keyword cache hit",
            InfoType::ValidationTargetMet => "Validation target met",
            InfoType::SearchStoppedEarly => "Search stopped early",
            InfoType::SearcherFallback => "Fell back to default searcher",
        }
    }
}
