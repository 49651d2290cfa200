//! Stream liveness probes.
//!
//! `.m3u8` playlists are fetched and must start a playlist (`#EXTM3U`) within
//! the first few kilobytes; any other stream gets a HEAD request and must
//! answer with a success or redirect status.

use std::time::Instant;

use reqwest::{Client, StatusCode};
use url::{Host, Url};

use crate::config::{ProbePolicy, SpeedPolicy, PROBE_READ_LIMIT};

const PLAYLIST_MARKER: &str = "#EXTM3U";
const ACCEPTED_HEAD_STATUSES: &[StatusCode] = &[
    StatusCode::OK,
    StatusCode::PARTIAL_CONTENT,
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
];

/// Returns true when the URL's host is an IPv6 literal (`http://[::1]:8080/`).
pub fn is_ipv6_literal(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .is_some_and(|u| matches!(u.host(), Some(Host::Ipv6(_))))
}

fn is_playlist(url: &str) -> bool {
    url.to_lowercase().contains(".m3u8")
}

/// Probes one stream URL with the given client and thresholds.
///
/// Never returns an error: every failure is an invalid link, except that
/// connect/timeout failures on IPv6 literal hosts are accepted when
/// `policy.lenient_ipv6` is set.
pub async fn probe_stream(client: &Client, url: &str, policy: &ProbePolicy) -> bool {
    let result = if is_playlist(url) {
        probe_playlist(client, url, policy).await
    } else {
        probe_head(client, url, policy).await
    };

    match result {
        Ok(valid) => valid,
        Err(e) if policy.lenient_ipv6 && is_ipv6_literal(url) && (e.is_connect() || e.is_timeout()) => {
            log::debug!("IPv6 probe failed, keeping link {}: {}", url, e);
            true
        }
        Err(e) => {
            log::debug!("Probe failed for {}: {}", url, e);
            false
        }
    }
}

async fn probe_playlist(
    client: &Client,
    url: &str,
    policy: &ProbePolicy,
) -> Result<bool, reqwest::Error> {
    let started = Instant::now();
    let mut response = client.get(url).timeout(policy.timeout).send().await?;
    if response.status() != StatusCode::OK {
        log::debug!("Playlist probe {} answered {}", url, response.status());
        return Ok(false);
    }

    let mut body: Vec<u8> = Vec::with_capacity(PROBE_READ_LIMIT);
    while body.len() < PROBE_READ_LIMIT {
        match response.chunk().await? {
            Some(chunk) => body.extend_from_slice(&chunk),
            None => break,
        }
    }
    body.truncate(PROBE_READ_LIMIT);

    let text = String::from_utf8_lossy(&body);
    if !text.contains(PLAYLIST_MARKER) {
        log::debug!("Playlist probe {} returned no {}", url, PLAYLIST_MARKER);
        return Ok(false);
    }

    Ok(speed_ok(url, body.len(), started, policy))
}

async fn probe_head(
    client: &Client,
    url: &str,
    policy: &ProbePolicy,
) -> Result<bool, reqwest::Error> {
    let response = client.head(url).timeout(policy.timeout).send().await?;
    let status = response.status();
    if !ACCEPTED_HEAD_STATUSES.contains(&status) {
        log::debug!("Stream probe {} answered {}", url, status);
        return Ok(false);
    }
    Ok(true)
}

/// Applies the minimum-speed threshold to a probe that read `bytes` bytes.
fn speed_ok(url: &str, bytes: usize, started: Instant, policy: &ProbePolicy) -> bool {
    if policy.min_speed_kbps == 0 {
        return true;
    }
    let secs = started.elapsed().as_secs_f64().max(0.001);
    let kbps = bytes as f64 / 1024.0 / secs;
    if kbps >= f64::from(policy.min_speed_kbps) {
        return true;
    }
    match policy.speed_policy {
        SpeedPolicy::LogOnly => {
            log::info!(
                "Slow link kept ({:.0} KB/s < {} KB/s): {}",
                kbps,
                policy.min_speed_kbps,
                url
            );
            true
        }
        SpeedPolicy::Reject => {
            log::debug!(
                "Slow link rejected ({:.0} KB/s < {} KB/s): {}",
                kbps,
                policy.min_speed_kbps,
                url
            );
            false
        }
    }
}
