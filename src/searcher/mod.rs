//! Site searchers.
//!
//! A site plugin implements the [`Searcher`] capability interface: preparing
//! its transport, fetching one result page, turning page content into
//! candidate [`Channel`]s and probing a candidate for liveness. Everything
//! above that (paging, validation fan-out, dedup, caching) lives in
//! [`ChannelSearcher`] and is shared by every site.
//!
//! Plugins are created by name through a [`SearcherRegistry`]; the built-in
//! `tonkiang` and `generic` plugins are registered by
//! [`SearcherRegistry::with_builtin`].

mod generic;
mod pacing;
mod probe;
mod registry;
mod search;
mod tonkiang;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::channel::Channel;
use crate::config::DEFAULT_MAX_NETWORK_OPS;
use crate::error_handling::{FetchError, ProcessingStats, SearcherError};
use crate::initialization::init_semaphore;

pub use generic::GenericSearcher;
pub use pacing::{random_delay, RequestPacer};
pub use probe::{is_ipv6_literal, probe_stream};
pub use registry::{register_builtin_searchers, SearcherConstructor, SearcherRegistry};
pub use search::ChannelSearcher;
pub use tonkiang::TonkiangSearcher;

/// Capability interface implemented by every site plugin.
///
/// Implementations must be shareable across tasks: probes for one channel run
/// concurrently against the same instance, so per-request identity (User-Agent,
/// Referer) is attached to each request rather than stored on `self`.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Human-readable site identifier, also recorded as each channel's source.
    fn site_name(&self) -> &str;

    /// Root URL of the site.
    fn base_url(&self) -> &str;

    fn description(&self) -> String {
        format!("{} IPTV searcher", self.site_name())
    }

    /// Prepares transport state (cookies, warm-up requests).
    ///
    /// Called exactly once by the registry, before the plugin is shared.
    async fn setup(&mut self) -> Result<(), SearcherError> {
        Ok(())
    }

    /// Fetches one result page for `keyword`, in a single attempt.
    ///
    /// A transport or HTTP failure is an `Err`; a page with no matches is
    /// `Ok` content that parses to nothing. Pacing and retries are applied
    /// by [`ChannelSearcher`].
    async fn send_search_request(&self, keyword: &str, page: u32) -> Result<String, FetchError>;

    /// Turns page content into candidates. Malformed fragments are skipped.
    fn parse_results(&self, content: &str, keyword: &str) -> Vec<Channel>;

    /// Probes one candidate. Any failure means "invalid".
    async fn validate_link(&self, channel: &Channel) -> bool;
}

/// Descriptive information about a searcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    pub name: String,
    pub url: String,
    pub description: String,
}

/// Resources shared by every searcher in a run.
///
/// `budget` caps concurrent network operations across all channels and all
/// validation batches; each search page request and each link probe holds
/// one permit while it is on the wire.
#[derive(Clone)]
pub struct SearchContext {
    pub budget: Arc<Semaphore>,
    pub stats: Arc<ProcessingStats>,
}

impl SearchContext {
    pub fn new(max_network_ops: usize) -> Self {
        SearchContext {
            budget: init_semaphore(max_network_ops.max(1)),
            stats: Arc::new(ProcessingStats::new()),
        }
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NETWORK_OPS)
    }
}
