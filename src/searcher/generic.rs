//! Template-driven searcher for simple portals.
//!
//! Sends `GET` to a `search_url` template such as
//! `https://portal.example/search?q={keyword}&page={page}` and accepts any of:
//! - JSON: `{"results": [...]}`, `{"channels": [...]}` or a bare array of
//!   objects with `name`/`title`, `url`/`stream_url`/`link` and optional
//!   `resolution`/`quality` fields
//! - HTML: anchors whose `href` is a stream URL
//! - plain text: `name,url` lines and bare stream URLs

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use serde_json::Value;
use url::Url;

use super::probe::probe_stream;
use super::tonkiang::is_channel_match;
use super::Searcher;
use crate::app::{is_valid_stream_url, validate_and_normalize_url};
use crate::channel::Channel;
use crate::config::{ProbePolicy, SearchConfig, BROWSER_HEADERS};
use crate::error_handling::{FetchError, SearcherError};
use crate::initialization::init_client;
use crate::user_agent::random_user_agent;
use crate::utils::{element_text, parse_selector_with_fallback};

static BARE_STREAM_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?|rtmp)://[^\s"'<>,]+"#).expect("stream url pattern is valid")
});

const NAME_FIELDS: &[&str] = &["name", "title", "channel"];
const URL_FIELDS: &[&str] = &["url", "stream_url", "link"];
const RESOLUTION_FIELDS: &[&str] = &["resolution", "quality"];

/// Searcher driven by a URL template.
pub struct GenericSearcher {
    client: Client,
    search_url: String,
    base_url: String,
    probe: ProbePolicy,
    mobile: bool,
}

impl GenericSearcher {
    pub const NAME: &'static str = "generic";

    pub fn new(config: &SearchConfig) -> Result<Self, SearcherError> {
        let search_url = config
            .search_url
            .clone()
            .ok_or_else(|| SearcherError::Setup("the generic searcher needs a search URL template".to_string()))?;
        if !search_url.contains("{keyword}") {
            return Err(SearcherError::Setup(format!(
                "search URL template '{}' has no {{keyword}} placeholder",
                search_url
            )));
        }
        let base_url = match &config.site_url {
            Some(site) => validate_and_normalize_url(site)
                .ok_or_else(|| SearcherError::Setup(format!("invalid site URL '{}'", site)))?,
            None => origin_of(&search_url).ok_or_else(|| {
                SearcherError::Setup(format!("invalid search URL template '{}'", search_url))
            })?,
        };

        Ok(GenericSearcher {
            client: init_client(config.timeout)?,
            search_url,
            base_url,
            probe: config.probe.clone(),
            mobile: config.mobile_mode,
        })
    }

    /// Fills the template for one page.
    pub fn page_url(&self, keyword: &str, page: u32) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
        self.search_url
            .replace("{keyword}", &encoded)
            .replace("{page}", &page.to_string())
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header("User-Agent", random_user_agent(self.mobile))
            .header("Referer", format!("{}/", self.base_url));
        for (name, value) in BROWSER_HEADERS {
            request = request.header(*name, *value);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    fn channel(&self, name: &str, url: &str, resolution: Option<&str>) -> Option<Channel> {
        Channel::new(name, url, resolution, self.site_name())
            .map_err(|e| log::debug!("[{}] Skipping {}: {}", self.site_name(), url, e))
            .ok()
    }

    fn parse_json(&self, value: &Value, keyword: &str) -> Vec<Channel> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(map) => match map
                .get("results")
                .or_else(|| map.get("channels"))
                .and_then(Value::as_array)
            {
                Some(items) => items,
                None => return Vec::new(),
            },
            _ => return Vec::new(),
        };

        items
            .iter()
            .filter_map(|item| {
                let url = first_str(item, URL_FIELDS)?;
                if !is_valid_stream_url(url) {
                    return None;
                }
                let name = first_str(item, NAME_FIELDS).unwrap_or(keyword);
                if !is_channel_match(name, keyword) {
                    return None;
                }
                self.channel(name, url, first_str(item, RESOLUTION_FIELDS))
            })
            .collect()
    }

    fn parse_markup(&self, content: &str, keyword: &str) -> Vec<Channel> {
        let mut seen = HashSet::new();
        let mut channels = Vec::new();

        if let Some(selector) = parse_selector_with_fallback("a[href]", "generic results") {
            let document = Html::parse_document(content);
            for anchor in document.select(&selector) {
                let Some(href) = anchor.value().attr("href").map(str::trim) else {
                    continue;
                };
                if !is_valid_stream_url(href) || seen.contains(href) {
                    continue;
                }
                let text = element_text(&anchor);
                let name = if text.is_empty() || text == href { keyword } else { text.as_str() };
                if !is_channel_match(name, keyword) {
                    continue;
                }
                if let Some(channel) = self.channel(name, href, None) {
                    seen.insert(href.to_string());
                    channels.push(channel);
                }
            }
        }

        for line in content.lines() {
            let line = line.trim();
            if let Some((name, url)) = line.split_once(',') {
                let (name, url) = (name.trim(), url.trim());
                if is_valid_stream_url(url) && !seen.contains(url) && is_channel_match(name, keyword) {
                    if let Some(channel) = self.channel(name, url, None) {
                        seen.insert(url.to_string());
                        channels.push(channel);
                    }
                }
            }
        }

        if channels.is_empty() {
            for m in BARE_STREAM_URL.find_iter(content) {
                let url = m.as_str();
                if is_valid_stream_url(url) && seen.insert(url.to_string()) {
                    channels.extend(self.channel(keyword, url, None));
                }
            }
        }

        channels
    }
}

fn origin_of(template: &str) -> Option<String> {
    let parsed = Url::parse(&template.replace("{keyword}", "k").replace("{page}", "1")).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

fn first_str<'a>(item: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .find_map(|f| item.get(f).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl Searcher for GenericSearcher {
    fn site_name(&self) -> &str {
        Self::NAME
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn description(&self) -> String {
        format!("Template searcher for {}", self.search_url)
    }

    async fn send_search_request(&self, keyword: &str, page: u32) -> Result<String, FetchError> {
        let url = self.page_url(keyword, page);
        log::debug!("[{}] GET {}", self.site_name(), url);
        self.fetch(&url).await
    }

    fn parse_results(&self, content: &str, keyword: &str) -> Vec<Channel> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return self.parse_json(&value, keyword);
            }
        }
        self.parse_markup(content, keyword)
    }

    async fn validate_link(&self, channel: &Channel) -> bool {
        probe_stream(&self.client, channel.url(), &self.probe).await
    }
}
