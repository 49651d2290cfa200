//! Batch orchestration over groups and channels.
//!
//! Groups run one after another. Inside a group, channels are searched either
//! serially with a random pause between them (worker count 1) or as spawned
//! tasks bounded by a per-group semaphore. Either way the group's buckets come
//! back in input order, and a channel whose search fails or panics yields an
//! empty bucket instead of aborting the run.

mod results;

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use log::{info, warn};

use crate::channel::ChannelGroup;
use crate::config::BatchConfig;
use crate::error_handling::{ErrorType, WarningType};
use crate::initialization::init_semaphore;
use crate::searcher::{random_delay, ChannelSearcher};

pub use results::{AggregateResults, ChannelResult, GroupResult};

/// Runs channel searches for a whole input list.
///
/// Cheap to clone: every clone shares the searcher and the progress counter.
#[derive(Clone)]
pub struct BatchProcessor {
    searcher: Arc<ChannelSearcher>,
    config: BatchConfig,
    completed: Arc<AtomicUsize>,
}

impl BatchProcessor {
    pub fn new(searcher: Arc<ChannelSearcher>, config: BatchConfig) -> Self {
        BatchProcessor {
            searcher,
            config,
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn searcher(&self) -> &ChannelSearcher {
        &self.searcher
    }

    /// Counter of channels finished so far, for progress logging.
    pub fn completed_channels(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.completed)
    }

    /// Searches one channel. Never fails: a panicking search is logged,
    /// counted and turned into an empty bucket.
    pub async fn process_single_channel(&self, name: &str) -> ChannelResult {
        let stats = &self.searcher.context().stats;
        let result = match AssertUnwindSafe(self.searcher.search_channels(name))
            .catch_unwind()
            .await
        {
            Ok(links) => ChannelResult::new(name, links),
            Err(_) => {
                warn!("Search for {} panicked, recording no results", name);
                stats.increment_error(ErrorType::ChannelTaskFailed);
                ChannelResult::empty(name)
            }
        };

        if result.is_empty() {
            warn!("No links found for {}", name);
            stats.increment_warning(WarningType::ChannelWithoutLinks);
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }

    /// Searches every channel of `group` and returns buckets in input order.
    pub async fn process_group(&self, group: &ChannelGroup) -> GroupResult {
        info!(
            "Processing group {} ({} channels)",
            group.name,
            group.channels.len()
        );
        let channels = if self.config.max_workers_per_group <= 1 {
            self.process_serial(group).await
        } else {
            self.process_concurrent(group).await
        };
        let result = GroupResult::new(&group.name, channels);
        info!(
            "Group {} done: {} links across {} channels",
            group.name,
            result.total_links(),
            result.channels.len()
        );
        result
    }

    /// Processes groups one at a time, preserving their order.
    pub async fn process_all_groups(&self, groups: &[ChannelGroup]) -> AggregateResults {
        let mut results = AggregateResults::new();
        for group in groups {
            results.push_group(self.process_group(group).await);
        }
        results
    }

    async fn process_serial(&self, group: &ChannelGroup) -> Vec<ChannelResult> {
        let mut results = Vec::with_capacity(group.channels.len());
        for (index, name) in group.channels.iter().enumerate() {
            if index > 0 {
                random_delay(self.config.channel_delay).await;
            }
            results.push(self.process_single_channel(name).await);
        }
        results
    }

    async fn process_concurrent(&self, group: &ChannelGroup) -> Vec<ChannelResult> {
        let workers = self.config.max_workers_per_group.min(group.channels.len().max(1));
        let semaphore = init_semaphore(workers);
        let mut slots: Vec<Option<ChannelResult>> = vec![None; group.channels.len()];
        let mut tasks = FuturesUnordered::new();

        for (index, name) in group.channels.iter().enumerate() {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("Semaphore closed, skipping channel: {}", name);
                    continue;
                }
            };
            let processor = self.clone();
            let name = name.clone();
            tasks.push(
                tokio::spawn(async move {
                    let _permit = permit;
                    processor.process_single_channel(&name).await
                })
                .map(move |joined| (index, joined)),
            );
        }

        while let Some((index, joined)) = tasks.next().await {
            match joined {
                Ok(result) => slots[index] = Some(result),
                Err(e) => {
                    warn!("Channel task {} failed: {}", group.channels[index], e);
                    self.searcher
                        .context()
                        .stats
                        .increment_error(ErrorType::ChannelTaskFailed);
                }
            }
        }

        slots
            .into_iter()
            .zip(&group.channels)
            .map(|(slot, name)| slot.unwrap_or_else(|| ChannelResult::empty(name)))
            .collect()
    }
}
