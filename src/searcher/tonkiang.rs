//! Tonkiang portal searcher.
//!
//! The portal answers a form POST (`seerch=<keyword>`) on its root with an
//! HTML page where every stream URL sits in a `<tba>` element; the channel
//! name and resolution are found in the surrounding markup.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html};

use super::probe::probe_stream;
use super::Searcher;
use crate::app::{is_valid_stream_url, validate_and_normalize_url};
use crate::channel::Channel;
use crate::config::{
    ProbePolicy, SearchConfig, BROWSER_HEADERS, FORM_CONTENT_TYPE, MIN_SEARCH_PAGE_LENGTH,
};
use crate::error_handling::{FetchError, SearcherError};
use crate::initialization::init_client;
use crate::user_agent::random_user_agent;
use crate::utils::parse_selector_with_fallback;

/// Ancestor levels searched for the channel name around a `<tba>` element.
const NAME_SEARCH_DEPTH: usize = 5;
/// Ancestor levels searched for resolution text.
const RESOLUTION_SEARCH_DEPTH: usize = 3;
/// Text longer than this is never a channel name.
const MAX_NAME_CHARS: usize = 50;
/// Fragments that mark text as markup noise rather than a channel name.
const NAME_NOISE: &[&str] = &["http", ".m3u8", ".ts", "onclick", "copy", "play"];
/// Fragments typical of channel names.
const NAME_HINTS: &[&str] = &["cctv", "卫视", "tv", "频道"];

static CCTV_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cctv[^\d]*(\d+)").expect("cctv pattern is valid"));
static RESOLUTION_DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{3,4})\s*[x×X]\s*(\d{3,4})").expect("dimensions pattern is valid")
});
static RESOLUTION_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3,4})[pP]").expect("lines pattern is valid"));
static RESOLUTION_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(8K|4K|UHD|FHD|HD)").expect("resolution keyword pattern is valid")
});

/// Searcher for the tonkiang.us IPTV portal.
pub struct TonkiangSearcher {
    client: Client,
    base_url: String,
    probe: ProbePolicy,
    mobile: bool,
}

impl TonkiangSearcher {
    pub const NAME: &'static str = "tonkiang";
    pub const DEFAULT_BASE_URL: &'static str = "https://tonkiang.us";

    pub fn new(config: &SearchConfig) -> Result<Self, SearcherError> {
        let base_url = match &config.site_url {
            Some(url) => validate_and_normalize_url(url)
                .ok_or_else(|| SearcherError::Setup(format!("invalid site URL '{}'", url)))?,
            None => Self::DEFAULT_BASE_URL.to_string(),
        };
        Ok(TonkiangSearcher {
            client: init_client(config.timeout)?,
            base_url,
            probe: config.probe.clone(),
            mobile: config.mobile_mode,
        })
    }

    async fn post_search(&self, keyword: &str, page: u32) -> Result<String, FetchError> {
        let mut request = self
            .client
            .post(format!("{}/", self.base_url))
            .header("User-Agent", random_user_agent(self.mobile))
            .header("Referer", format!("{}/", self.base_url))
            .header("Origin", &self.base_url)
            .header("Content-Type", FORM_CONTENT_TYPE);
        for (name, value) in BROWSER_HEADERS {
            request = request.header(*name, *value);
        }
        let request = if page > 1 {
            request.form(&[("seerch", keyword.to_string()), ("page", page.to_string())])
        } else {
            request.form(&[("seerch", keyword)])
        };

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("[{}] Search answered {}", self.site_name(), status);
            return Err(FetchError::Status(status.as_u16()));
        }
        let content = response.text().await?;
        if content.len() < MIN_SEARCH_PAGE_LENGTH {
            log::warn!(
                "[{}] Search page too short ({} bytes)",
                self.site_name(),
                content.len()
            );
            return Err(FetchError::ContentTooShort { len: content.len() });
        }
        Ok(content)
    }
}

#[async_trait]
impl Searcher for TonkiangSearcher {
    fn site_name(&self) -> &str {
        "Tonkiang.us"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Visits the homepage once so the cookie store holds a session.
    async fn setup(&mut self) -> Result<(), SearcherError> {
        let response = self
            .client
            .get(&self.base_url)
            .header("User-Agent", random_user_agent(self.mobile))
            .send()
            .await;
        match response {
            Ok(r) if r.status().is_success() => {
                log::debug!("[{}] Homepage warm-up succeeded", self.site_name())
            }
            Ok(r) => log::warn!("[{}] Homepage warm-up answered {}", self.site_name(), r.status()),
            Err(e) => log::warn!("[{}] Homepage warm-up failed: {}", self.site_name(), e),
        }
        Ok(())
    }

    async fn send_search_request(&self, keyword: &str, page: u32) -> Result<String, FetchError> {
        log::debug!("[{}] Searching {} (page {})", self.site_name(), keyword, page);
        self.post_search(keyword, page).await
    }

    fn parse_results(&self, content: &str, keyword: &str) -> Vec<Channel> {
        let Some(selector) = parse_selector_with_fallback("tba", "tonkiang results") else {
            return Vec::new();
        };
        let document = Html::parse_document(content);
        let mut channels = Vec::new();

        for tba in document.select(&selector) {
            let url: String = tba.text().collect::<String>().trim().to_string();
            if !is_valid_stream_url(&url) {
                continue;
            }
            let Some(name) = find_channel_name(&tba, keyword) else {
                continue;
            };
            if !is_channel_match(&name, keyword) {
                log::debug!("[{}] Filtered '{}' (not '{}')", self.site_name(), name, keyword);
                continue;
            }
            let resolution = find_resolution(&tba);
            match Channel::new(&name, &url, resolution.as_deref(), self.site_name()) {
                Ok(channel) => channels.push(channel),
                Err(e) => log::debug!("[{}] Skipping {}: {}", self.site_name(), url, e),
            }
        }

        log::info!(
            "[{}] Parsed {} candidates for {}",
            self.site_name(),
            channels.len(),
            keyword
        );
        channels
    }

    async fn validate_link(&self, channel: &Channel) -> bool {
        probe_stream(&self.client, channel.url(), &self.probe).await
    }
}

fn ancestors<'a>(element: &ElementRef<'a>, depth: usize) -> impl Iterator<Item = ElementRef<'a>> {
    element.ancestors().filter_map(ElementRef::wrap).take(depth)
}

/// Finds the channel name in the markup around a `<tba>` stream element.
fn find_channel_name(tba: &ElementRef<'_>, keyword: &str) -> Option<String> {
    for ancestor in ancestors(tba, NAME_SEARCH_DEPTH) {
        let candidates: Vec<&str> = ancestor
            .text()
            .map(str::trim)
            .filter(|t| t.chars().count() > 1 && t.chars().count() <= MAX_NAME_CHARS)
            .filter(|t| {
                let lower = t.to_lowercase();
                !NAME_NOISE.iter().any(|n| lower.contains(n))
            })
            .collect();

        let hinted = candidates.iter().find(|t| {
            let lower = t.to_lowercase();
            NAME_HINTS.iter().any(|h| lower.contains(h))
        });
        if let Some(name) = hinted.or_else(|| candidates.iter().find(|t| is_channel_match(t, keyword))) {
            return Some((*name).to_string());
        }
    }
    None
}

/// Finds resolution text near a `<tba>` element.
///
/// At each ancestor level `WxH` wins over `NNNp`, which wins over keywords
/// such as `4K` or `HD`, wherever they appear in the text.
fn find_resolution(tba: &ElementRef<'_>) -> Option<String> {
    for ancestor in ancestors(tba, RESOLUTION_SEARCH_DEPTH) {
        let text: String = ancestor.text().collect::<Vec<_>>().join(" ");
        if let Some(caps) = RESOLUTION_DIMENSIONS.captures(&text) {
            return Some(format!("{}x{}", &caps[1], &caps[2]));
        }
        if let Some(caps) = RESOLUTION_LINES.captures(&text) {
            return Some(format!("{}p", &caps[1]));
        }
        if let Some(caps) = RESOLUTION_KEYWORD.captures(&text) {
            return Some(caps[1].to_uppercase());
        }
    }
    None
}

/// Decides whether a scraped channel name answers a search keyword.
///
/// Exact (case-insensitive) and punctuation-insensitive matches pass. For
/// CCTV keywords the channel numbers must agree, so `CCTV-1` does not match
/// `CCTV-10`. Otherwise the keyword must be a substring of the name.
pub fn is_channel_match(channel_name: &str, keyword: &str) -> bool {
    let channel = channel_name.trim().to_lowercase();
    let keyword = keyword.trim().to_lowercase();
    if channel.is_empty() || keyword.is_empty() {
        return false;
    }
    if channel == keyword {
        return true;
    }

    let clean = |s: &str| s.chars().filter(|c| c.is_alphanumeric()).collect::<String>();
    if clean(&channel) == clean(&keyword) {
        return true;
    }

    if keyword.contains("cctv") {
        let number = |s: &str| CCTV_NUMBER.captures(s).map(|c| c[1].to_string());
        if let (Some(k), Some(c)) = (number(&keyword), number(&channel)) {
            return k == c;
        }
    }

    channel.contains(&keyword)
}
