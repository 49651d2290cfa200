//! URL validation and normalization utilities.

use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::config::MIN_STREAM_URL_LENGTH;

/// Maximum URL length (2048 characters), matching common browser and server limits.
const MAX_URL_LENGTH: usize = 2048;

/// Schemes players cannot fetch over plain HTTP tooling.
const REJECTED_STREAM_PROTOCOLS: &[&str] = &["udp://", "rtp://", "rtsp://"];

/// File extensions that mark a URL as a media stream.
const STREAM_EXTENSIONS: &[&str] = &[".m3u8", ".ts", ".flv", ".mp4", ".mkv"];

static STREAM_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?|rtmp)://").expect("scheme pattern is valid"));
static EXPLICIT_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\d{2,5}/").expect("port pattern is valid"));

/// Validates and normalizes a site URL given on the command line.
///
/// Adds an https:// prefix if missing, strips a trailing slash and requires an
/// http/https URL with a host. Logs a warning and returns None otherwise.
pub fn validate_and_normalize_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL exceeding maximum length ({} > {})",
            url.len(),
            MAX_URL_LENGTH
        );
        return None;
    }

    let normalized = if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("https://{url}")
    } else {
        url.to_string()
    };

    match url::Url::parse(&normalized) {
        Ok(parsed) if parsed.host_str().is_some() => match parsed.scheme() {
            "http" | "https" => Some(normalized.trim_end_matches('/').to_string()),
            _ => {
                warn!("Skipping unsupported scheme for URL: {url}");
                None
            }
        },
        _ => {
            warn!("Skipping invalid URL: {url}");
            None
        }
    }
}

/// Checks whether scraped text looks like a playable stream URL.
///
/// Accepts http/https/rtmp URLs that either end in a known stream extension
/// or name an explicit port; multicast style protocols are rejected.
pub fn is_valid_stream_url(url: &str) -> bool {
    if url.len() < MIN_STREAM_URL_LENGTH || url.len() > MAX_URL_LENGTH {
        return false;
    }
    let lower = url.to_lowercase();
    if REJECTED_STREAM_PROTOCOLS.iter().any(|p| lower.contains(p)) {
        log::debug!("Skipping unsupported protocol: {}", url);
        return false;
    }
    if !STREAM_SCHEME.is_match(url) {
        return false;
    }
    STREAM_EXTENSIONS.iter().any(|ext| lower.contains(ext)) || EXPLICIT_PORT.is_match(url)
}
