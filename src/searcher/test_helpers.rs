//! Scripted searcher double for unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use url::Url;

use super::Searcher;
use crate::channel::Channel;
use crate::config::SearchConfig;
use crate::error_handling::FetchError;

/// What a scripted page request does.
#[derive(Clone)]
pub enum PageScript {
    Candidates(Vec<Channel>),
    /// Answers 503 on the first request, then the candidates.
    FailOnce(Vec<Channel>),
    Fail,
    Panic,
}

/// Default search parameters with pacing off and a single attempt per page.
pub fn unpaced_config() -> SearchConfig {
    SearchConfig {
        request_delay: (0.0, 0.0),
        min_request_interval: Duration::ZERO,
        max_retries: 1,
        ..SearchConfig::default()
    }
}

/// Builds `n` candidates for `name` on hosts `10.0.0.0` .. `10.0.0.{n-1}`.
pub fn candidates(name: &str, n: usize) -> Vec<Channel> {
    (0..n)
        .map(|i| {
            Channel::new(
                name,
                &format!("http://10.0.0.{}:8080/{}.m3u8", i, name.to_lowercase()),
                Some("1920x1080"),
                "scripted",
            )
            .expect("valid candidate")
        })
        .collect()
}

fn host_index(url: &str) -> Option<usize> {
    let url = Url::parse(url).ok()?;
    url.host_str()?.rsplit('.').next()?.parse().ok()
}

/// A searcher whose pages and probe outcomes are fixed in advance.
///
/// Probe outcomes are keyed by the last octet of the candidate's host, which
/// is the candidate index for channels built by [`candidates`].
pub struct ScriptedSearcher {
    pages: Vec<PageScript>,
    rejected: HashSet<usize>,
    panicking: HashSet<usize>,
    slow: HashSet<usize>,
    slow_delay: Duration,
    failed_pages: Mutex<HashSet<u32>>,
    /// Notified each time a scripted page request fails.
    pub failures: Notify,
    pub search_calls: AtomicUsize,
    pub probe_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedSearcher {
    pub fn new(pages: Vec<PageScript>) -> Self {
        ScriptedSearcher {
            pages,
            rejected: HashSet::new(),
            panicking: HashSet::new(),
            slow: HashSet::new(),
            slow_delay: Duration::ZERO,
            failed_pages: Mutex::new(HashSet::new()),
            failures: Notify::new(),
            search_calls: AtomicUsize::new(0),
            probe_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(mut self, indices: &[usize]) -> Self {
        self.rejected.extend(indices);
        self
    }

    pub fn panicking(mut self, indices: &[usize]) -> Self {
        self.panicking.extend(indices);
        self
    }

    pub fn slow(mut self, indices: &[usize], delay: Duration) -> Self {
        self.slow.extend(indices);
        self.slow_delay = delay;
        self
    }
}

#[async_trait]
impl Searcher for ScriptedSearcher {
    fn site_name(&self) -> &str {
        "scripted"
    }

    fn base_url(&self) -> &str {
        "http://scripted.test"
    }

    async fn send_search_request(&self, _keyword: &str, page: u32) -> Result<String, FetchError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(page as usize - 1) {
            Some(PageScript::Candidates(_)) => Ok(page.to_string()),
            Some(PageScript::FailOnce(_)) => {
                let first = self
                    .failed_pages
                    .lock()
                    .expect("failed pages lock")
                    .insert(page);
                if first {
                    self.failures.notify_one();
                    Err(FetchError::Status(503))
                } else {
                    Ok(page.to_string())
                }
            }
            Some(PageScript::Fail) => {
                self.failures.notify_one();
                Err(FetchError::Status(503))
            }
            Some(PageScript::Panic) => panic!("scripted search failure"),
            None => Ok(String::new()),
        }
    }

    fn parse_results(&self, content: &str, _keyword: &str) -> Vec<Channel> {
        let page: usize = match content.parse() {
            Ok(page) => page,
            Err(_) => return Vec::new(),
        };
        match self.pages.get(page - 1) {
            Some(PageScript::Candidates(channels)) | Some(PageScript::FailOnce(channels)) => {
                channels.clone()
            }
            _ => Vec::new(),
        }
    }

    async fn validate_link(&self, channel: &Channel) -> bool {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let index = host_index(channel.url());
        if index.is_some_and(|i| self.slow.contains(&i)) {
            tokio::time::sleep(self.slow_delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if index.is_some_and(|i| self.panicking.contains(&i)) {
            panic!("scripted probe failure");
        }
        !index.is_some_and(|i| self.rejected.contains(&i))
    }
}
