//! Channel value types.
//!
//! A [`Channel`] is one discovered stream candidate: the channel name it was
//! listed under, its stream URL, a resolution label and the quality tier
//! derived from it. Records are validated on construction and immutable
//! afterwards.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::config::MIN_STREAM_URL_LENGTH;
use crate::error_handling::ChannelError;

/// Label used when a candidate carries no resolution text.
pub const UNKNOWN_RESOLUTION: &str = "unknown";

/// URL schemes a player can open over the network.
pub const STREAM_SCHEMES: &[&str] = &["http", "https", "rtmp"];

static DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{3,4})\s*[xX×*]\s*(\d{3,4})").expect("dimension pattern is valid")
});
static PROGRESSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{3,4})\s*[pPiI](?:[^A-Za-z]|$)").expect("progressive pattern is valid")
});
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number pattern is valid"));

/// Quality tier derived from the parsed resolution height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// 1080 lines or more
    High,
    /// 720 lines or more
    Standard,
    /// Below 720 lines
    Low,
    /// No numeric resolution was found
    Unknown,
}

impl QualityTier {
    pub fn from_height(height: Option<u32>) -> Self {
        match height {
            Some(h) if h >= 1080 => QualityTier::High,
            Some(h) if h >= 720 => QualityTier::Standard,
            Some(_) => QualityTier::Low,
            None => QualityTier::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::High => "high",
            QualityTier::Standard => "standard",
            QualityTier::Low => "low",
            QualityTier::Unknown => "unknown",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a vertical resolution out of free-form resolution text.
///
/// Recognises `1920x1080` style dimensions, `1080p`, the `8K`/`4K`/`UHD`/
/// `FHD`/`HD` keywords and, as a last resort, the first bare number.
pub fn parse_height(text: &str) -> Option<u32> {
    if let Some(caps) = DIMENSIONS.captures(text) {
        return caps[2].parse().ok();
    }
    if let Some(caps) = PROGRESSIVE.captures(text) {
        return caps[1].parse().ok();
    }

    let upper = text.to_uppercase();
    if upper.contains("8K") {
        return Some(4320);
    }
    if upper.contains("4K") || upper.contains("UHD") {
        return Some(2160);
    }
    if upper.contains("FHD") {
        return Some(1080);
    }
    if upper.contains("HD") {
        return Some(720);
    }

    FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .filter(|h| *h > 0)
}

/// One discovered stream for a named channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    name: String,
    url: String,
    resolution: String,
    #[serde(skip)]
    height: Option<u32>,
    quality: QualityTier,
    source: String,
}

impl Channel {
    /// Builds a channel record, rejecting empty names and unusable URLs.
    pub fn new(
        name: &str,
        url: &str,
        resolution: Option<&str>,
        source: &str,
    ) -> Result<Self, ChannelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChannelError::EmptyName);
        }
        let url = url.trim();
        if url.is_empty() {
            return Err(ChannelError::EmptyUrl);
        }
        let parsed = Url::parse(url).map_err(|_| ChannelError::InvalidUrl(url.to_string()))?;
        if !STREAM_SCHEMES.contains(&parsed.scheme()) {
            return Err(ChannelError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        if url.len() < MIN_STREAM_URL_LENGTH {
            return Err(ChannelError::InvalidUrl(url.to_string()));
        }

        let resolution = resolution
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(UNKNOWN_RESOLUTION)
            .to_string();
        let height = parse_height(&resolution);

        Ok(Channel {
            name: name.to_string(),
            url: url.to_string(),
            resolution,
            height,
            quality: QualityTier::from_height(height),
            source: source.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn resolution(&self) -> &str {
        &self.resolution
    }

    /// Parsed vertical resolution, if the label contained one.
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn quality(&self) -> QualityTier {
        self.quality
    }

    /// Identifier of the site the candidate was scraped from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A named bucket of channel names, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    pub name: String,
    pub channels: Vec<String>,
}

impl ChannelGroup {
    pub fn new(name: impl Into<String>, channels: Vec<String>) -> Self {
        ChannelGroup {
            name: name.into(),
            channels,
        }
    }
}
