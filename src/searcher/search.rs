//! Site-independent search orchestration.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_retry::RetryIf;

use super::pacing::RequestPacer;
use super::{SearchContext, Searcher, SiteInfo};
use crate::channel::Channel;
use crate::config::SearchConfig;
use crate::error_handling::{
    get_retry_strategy, update_error_stats, FetchError, InfoType, WarningType,
};
use crate::utils::is_retriable_error;
use crate::validation::{validate_candidates, ValidationSettings};

/// Pages through a site for a keyword, validates candidates and caches the
/// final list per keyword.
///
/// One instance is shared (behind an `Arc`) by every channel task of a run,
/// so its pacer spaces the search requests of all channels.
pub struct ChannelSearcher {
    site: Arc<dyn Searcher>,
    config: SearchConfig,
    ctx: SearchContext,
    pacer: RequestPacer,
    cache: Option<Mutex<HashMap<String, Vec<Channel>>>>,
}

impl ChannelSearcher {
    pub fn new(site: Arc<dyn Searcher>, config: SearchConfig, ctx: SearchContext) -> Self {
        let cache = config.enable_cache.then(|| Mutex::new(HashMap::new()));
        let pacer = RequestPacer::new(config.min_request_interval, config.request_delay);
        ChannelSearcher {
            site,
            config,
            ctx,
            pacer,
            cache,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn context(&self) -> &SearchContext {
        &self.ctx
    }

    pub fn site_info(&self) -> SiteInfo {
        SiteInfo {
            name: self.site.site_name().to_string(),
            url: self.site.base_url().to_string(),
            description: self.site.description(),
        }
    }

    /// Searches `keyword` and returns at most `max_results` unique links.
    ///
    /// Paging stops at `max_pages`, on the first page that fails or parses to
    /// nothing, or once `min_valid_links` validated links are collected. A
    /// failed page keeps whatever earlier pages produced.
    pub async fn search_channels(&self, keyword: &str) -> Vec<Channel> {
        let site_name = self.site.site_name();
        let max_results = self.config.max_results;

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.lock().await.get(keyword) {
                log::info!("[{}] Using cached results for {}", site_name, keyword);
                self.ctx.stats.increment_info(InfoType::CacheHit);
                return cached.iter().take(max_results).cloned().collect();
            }
        }

        log::info!("[{}] Searching {}", site_name, keyword);
        let settings = ValidationSettings::from(&self.config);
        let mut accumulated: Vec<Channel> = Vec::new();
        let mut page = 1u32;

        while accumulated.len() < max_results && page <= self.config.max_pages {
            log::debug!("[{}] Requesting page {} for {}", site_name, page, keyword);
            let content = match self.fetch_page(keyword, page).await {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("[{}] Page {} for {} failed: {}", site_name, page, keyword, e);
                    update_error_stats(&self.ctx.stats, &e);
                    break;
                }
            };

            let parsed = self.site.parse_results(&content, keyword);
            if parsed.is_empty() {
                log::info!("[{}] Page {} has no results, stopping", site_name, page);
                break;
            }
            let candidates = self.filter_resolution(parsed);
            if candidates.is_empty() {
                log::info!(
                    "[{}] Page {} has nothing at or above {}p",
                    site_name,
                    page,
                    self.config.min_resolution
                );
                page += 1;
                continue;
            }

            if self.config.enable_validation {
                let remaining_needed = self.config.min_valid_links.saturating_sub(accumulated.len());
                if remaining_needed == 0 {
                    log::info!(
                        "[{}] Already have {}/{} links, skipping page {}",
                        site_name,
                        accumulated.len(),
                        self.config.min_valid_links,
                        page
                    );
                    self.ctx.stats.increment_info(InfoType::SearchStoppedEarly);
                    break;
                }

                let found = candidates.len();
                let outcome = validate_candidates(
                    self.site.as_ref(),
                    candidates,
                    remaining_needed,
                    &settings,
                    &self.ctx,
                )
                .await;
                log::info!(
                    "[{}] Page {}: {} links, {} valid",
                    site_name,
                    page,
                    found,
                    outcome.valid.len()
                );
                accumulated.extend(outcome.valid);

                if accumulated.len() >= self.config.min_valid_links {
                    log::info!(
                        "[{}] Reached target links ({}/{}), stopping",
                        site_name,
                        accumulated.len(),
                        self.config.min_valid_links
                    );
                    self.ctx.stats.increment_info(InfoType::SearchStoppedEarly);
                    break;
                }
            } else {
                accumulated.extend(candidates);
            }

            page += 1;
        }

        let final_channels: Vec<Channel> = dedup_by_url(accumulated)
            .into_iter()
            .take(max_results)
            .collect();

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .await
                .insert(keyword.to_string(), final_channels.clone());
        }

        log::info!(
            "[{}] Search finished: {}, {} links",
            site_name,
            keyword,
            final_channels.len()
        );
        final_channels
    }

    /// Fetches one page: waits for the pacer, then tries up to `max_retries`
    /// times with backoff on retriable errors.
    ///
    /// A budget permit is held only while an attempt is on the wire, never
    /// during the pacing or backoff sleeps.
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String, FetchError> {
        self.pacer.wait().await;
        RetryIf::spawn(
            get_retry_strategy(self.config.max_retries),
            || self.attempt_page(keyword, page),
            |e: &FetchError| {
                let retry = is_retriable_error(e);
                if retry {
                    log::debug!(
                        "[{}] Retrying page {} for {} after: {}",
                        self.site.site_name(),
                        page,
                        keyword,
                        e
                    );
                }
                retry
            },
        )
        .await
    }

    async fn attempt_page(&self, keyword: &str, page: u32) -> Result<String, FetchError> {
        let _permit = self
            .ctx
            .budget
            .acquire()
            .await
            .map_err(|_| FetchError::BudgetClosed)?;
        self.site.send_search_request(keyword, page).await
    }

    /// Drops candidates whose known height is below `min_resolution`.
    fn filter_resolution(&self, candidates: Vec<Channel>) -> Vec<Channel> {
        let min = self.config.min_resolution;
        if min == 0 {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|c| match c.height() {
                Some(h) if h < min => {
                    log::debug!("Skipping {} ({} < {}p)", c.url(), c.resolution(), min);
                    self.ctx
                        .stats
                        .increment_warning(WarningType::CandidateBelowMinResolution);
                    false
                }
                _ => true,
            })
            .collect()
    }

    /// Empties the per-keyword cache.
    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().await.clear();
            log::info!("[{}] Cache cleared", self.site.site_name());
        }
    }

    /// Keywords currently cached, sorted.
    pub async fn cached_keywords(&self) -> Vec<String> {
        match &self.cache {
            Some(cache) => {
                let mut keys: Vec<String> = cache.lock().await.keys().cloned().collect();
                keys.sort();
                keys
            }
            None => Vec::new(),
        }
    }
}

/// Removes later channels whose URL was already seen, keeping first-seen order.
pub fn dedup_by_url(channels: Vec<Channel>) -> Vec<Channel> {
    let mut seen = HashSet::new();
    channels
        .into_iter()
        .filter(|c| seen.insert(c.url().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorType;
    use crate::searcher::test_helpers::{candidates, unpaced_config, PageScript, ScriptedSearcher};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn config() -> SearchConfig {
        SearchConfig {
            max_results: 10,
            min_valid_links: 3,
            concurrent_workers: 6,
            max_pages: 3,
            ..unpaced_config()
        }
    }

    fn searcher(site: Arc<ScriptedSearcher>, config: SearchConfig) -> ChannelSearcher {
        ChannelSearcher::new(site, config, SearchContext::default())
    }

    #[tokio::test]
    async fn test_scenario_stops_after_first_page() {
        let site = Arc::new(
            ScriptedSearcher::new(vec![
                PageScript::Candidates(candidates("CCTV-1", 5)),
                PageScript::Candidates(candidates("CCTV-1", 5)),
            ])
            .rejecting(&[0, 2]),
        );
        let searcher = searcher(Arc::clone(&site), config());

        let result = searcher.search_channels("CCTV-1").await;

        let urls: Vec<&str> = result.iter().map(|c| c.url()).collect();
        assert_eq!(
            urls,
            vec![
                "http://10.0.0.1:8080/cctv-1.m3u8",
                "http://10.0.0.3:8080/cctv-1.m3u8",
                "http://10.0.0.4:8080/cctv-1.m3u8",
            ]
        );
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_results_are_deduplicated() {
        let mut page = candidates("CCTV-1", 3);
        page.extend(candidates("CCTV-1", 3));
        let site = Arc::new(ScriptedSearcher::new(vec![PageScript::Candidates(page)]));
        let config = SearchConfig {
            enable_validation: false,
            max_pages: 1,
            ..config()
        };
        let result = searcher(site, config).search_channels("CCTV-1").await;

        assert_eq!(result.len(), 3);
        let unique: HashSet<&str> = result.iter().map(|c| c.url()).collect();
        assert_eq!(unique.len(), result.len());
    }

    #[tokio::test]
    async fn test_pages_until_target_across_pages() {
        let page_one = candidates("CCTV-1", 2);
        let page_two: Vec<Channel> = candidates("CCTV-1", 6).into_iter().skip(2).collect();
        let site = Arc::new(ScriptedSearcher::new(vec![
            PageScript::Candidates(page_one),
            PageScript::Candidates(page_two),
            PageScript::Candidates(candidates("CCTV-1", 8)),
        ]));
        let result = searcher(Arc::clone(&site), config())
            .search_channels("CCTV-1")
            .await;

        assert_eq!(result.len(), 3);
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_earlier_pages() {
        let site = Arc::new(ScriptedSearcher::new(vec![
            PageScript::Candidates(candidates("CCTV-1", 1)),
            PageScript::Fail,
            PageScript::Candidates(candidates("CCTV-1", 5)),
        ]));
        let searcher = searcher(Arc::clone(&site), config());
        let result = searcher.search_channels("CCTV-1").await;

        assert_eq!(result.len(), 1);
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            searcher
                .context()
                .stats
                .get_error_count(ErrorType::SearchServiceUnavailable),
            1
        );
    }

    #[tokio::test]
    async fn test_empty_page_stops_paging() {
        let site = Arc::new(ScriptedSearcher::new(vec![PageScript::Candidates(vec![])]));
        let result = searcher(Arc::clone(&site), config())
            .search_channels("CCTV-1")
            .await;
        assert!(result.is_empty());
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_site() {
        let site = Arc::new(ScriptedSearcher::new(vec![PageScript::Candidates(
            candidates("CCTV-1", 4),
        )]));
        let searcher = searcher(Arc::clone(&site), config());

        let first = searcher.search_channels("CCTV-1").await;
        let second = searcher.search_channels("CCTV-1").await;

        assert_eq!(first, second);
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 1);
        assert_eq!(searcher.cached_keywords().await, vec!["CCTV-1".to_string()]);
        assert_eq!(searcher.context().stats.get_info_count(InfoType::CacheHit), 1);

        searcher.clear_cache().await;
        assert!(searcher.cached_keywords().await.is_empty());
        searcher.search_channels("CCTV-1").await;
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let site = Arc::new(ScriptedSearcher::new(vec![PageScript::Candidates(
            candidates("CCTV-1", 4),
        )]));
        let config = SearchConfig {
            enable_cache: false,
            ..config()
        };
        let searcher = searcher(Arc::clone(&site), config);
        searcher.search_channels("CCTV-1").await;
        searcher.search_channels("CCTV-1").await;
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 2);
        assert!(searcher.cached_keywords().await.is_empty());
    }

    #[tokio::test]
    async fn test_min_resolution_filters_known_low_heights() {
        let low = Channel::new("CCTV-1", "http://10.0.0.7:8080/low.m3u8", Some("720x576"), "t")
            .expect("valid");
        let unknown = Channel::new("CCTV-1", "http://10.0.0.8:8080/unk.m3u8", None, "t")
            .expect("valid");
        let mut page = candidates("CCTV-1", 1);
        page.push(low);
        page.push(unknown);
        let site = Arc::new(ScriptedSearcher::new(vec![PageScript::Candidates(page)]));
        let config = SearchConfig {
            min_resolution: 720,
            enable_validation: false,
            max_pages: 1,
            ..config()
        };
        let result = searcher(site, config).search_channels("CCTV-1").await;

        let urls: Vec<&str> = result.iter().map(|c| c.url()).collect();
        assert_eq!(
            urls,
            vec!["http://10.0.0.0:8080/cctv-1.m3u8", "http://10.0.0.8:8080/unk.m3u8"]
        );
    }

    #[tokio::test]
    async fn test_low_resolution_page_does_not_end_paging() {
        let low_res: Vec<Channel> = (0..3)
            .map(|i| {
                Channel::new(
                    "CCTV-1",
                    &format!("http://10.0.1.{}:8080/sd.m3u8", i),
                    Some("720x576"),
                    "t",
                )
                .expect("valid")
            })
            .collect();
        let site = Arc::new(ScriptedSearcher::new(vec![
            PageScript::Candidates(low_res),
            PageScript::Candidates(candidates("CCTV-1", 4)),
        ]));
        let config = SearchConfig {
            min_resolution: 720,
            ..config()
        };
        let searcher = searcher(Arc::clone(&site), config);
        let result = searcher.search_channels("CCTV-1").await;

        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|c| c.height() == Some(1080)));
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            searcher
                .context()
                .stats
                .get_warning_count(WarningType::CandidateBelowMinResolution),
            3
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retriable_failure_is_retried() {
        let site = Arc::new(ScriptedSearcher::new(vec![PageScript::FailOnce(candidates(
            "CCTV-1", 2,
        ))]));
        let config = SearchConfig {
            max_retries: 3,
            enable_validation: false,
            max_pages: 1,
            ..config()
        };
        let result = searcher(Arc::clone(&site), config)
            .search_channels("CCTV-1")
            .await;
        assert_eq!(result.len(), 2);
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_is_released_during_backoff() {
        let site = Arc::new(ScriptedSearcher::new(vec![PageScript::FailOnce(candidates(
            "CCTV-1", 2,
        ))]));
        let config = SearchConfig {
            max_retries: 3,
            enable_validation: false,
            max_pages: 1,
            ..config()
        };
        let ctx = SearchContext::new(1);
        let budget = Arc::clone(&ctx.budget);
        let searcher = Arc::new(ChannelSearcher::new(site.clone(), config, ctx));

        let task = {
            let searcher = Arc::clone(&searcher);
            tokio::spawn(async move { searcher.search_channels("CCTV-1").await })
        };
        site.failures.notified().await;
        assert!(
            budget.try_acquire().is_ok(),
            "permit must be free while the page waits to be retried"
        );

        let result = task.await.expect("search task");
        assert_eq!(result.len(), 2);
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_is_released_during_pacing() {
        let site = Arc::new(ScriptedSearcher::new(vec![PageScript::Candidates(
            candidates("CCTV-1", 2),
        )]));
        let config = SearchConfig {
            request_delay: (1.0, 1.0),
            enable_validation: false,
            max_pages: 1,
            ..config()
        };
        let ctx = SearchContext::new(1);
        let budget = Arc::clone(&ctx.budget);
        let searcher = Arc::new(ChannelSearcher::new(site.clone(), config, ctx));

        let task = {
            let searcher = Arc::clone(&searcher);
            tokio::spawn(async move { searcher.search_channels("CCTV-1").await })
        };
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(site.search_calls.load(Ordering::SeqCst), 0);
        assert!(budget.try_acquire().is_ok());

        assert_eq!(task.await.expect("search task").len(), 2);
    }

    #[tokio::test]
    async fn test_max_results_truncates() {
        let site = Arc::new(ScriptedSearcher::new(vec![PageScript::Candidates(
            candidates("CCTV-1", 8),
        )]));
        let config = SearchConfig {
            enable_validation: false,
            max_results: 5,
            ..config()
        };
        let result = searcher(site, config).search_channels("CCTV-1").await;
        assert_eq!(result.len(), 5);
    }
}
