//! Host frequency ranking.
//!
//! Links whose host (hostname or IPv4 address) recurs across the whole result
//! set are moved to the front of each channel's list: a host that serves many
//! working channels is usually a stable aggregator.
//!
//! Key functions:
//! - `extract_host_key()` - Grouping key of a stream URL
//! - `DomainFrequency::collect()` - Counts keys across every bucket once
//! - `DomainFrequency::rank_results()` - Reorders each channel bucket in place

use std::cmp::Reverse;
use std::collections::HashMap;

use url::Host;

use crate::batch::AggregateResults;
use crate::channel::Channel;

/// Number of hosts logged after collection.
const TOP_HOSTS_LOGGED: usize = 10;

/// Extracts the grouping key of a stream URL.
///
/// IPv4 literals are used verbatim and hostnames as-is (no DNS resolution).
/// IPv6 literals keep their bracketed text form. URLs that do not parse, or
/// have no host, group under the raw URL string.
pub fn extract_host_key(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => match parsed.host() {
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv6(_)) => parsed.host_str().unwrap_or(url).to_string(),
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Occurrence counts of host keys across a result set.
#[derive(Debug, Clone, Default)]
pub struct DomainFrequency {
    counts: HashMap<String, usize>,
}

impl DomainFrequency {
    /// Scans every channel of every bucket once.
    pub fn collect(results: &AggregateResults) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for channel in results.iter_links() {
            *counts.entry(extract_host_key(channel.url())).or_insert(0) += 1;
        }
        let frequency = DomainFrequency { counts };

        if !frequency.is_empty() {
            log::info!("Collected {} distinct hosts", frequency.len());
            for (host, count) in frequency.top(TOP_HOSTS_LOGGED) {
                log::info!("   {}: {} links", host, count);
            }
        }
        frequency
    }

    /// Occurrences of `host`, 0 when unseen.
    pub fn frequency(&self, host: &str) -> usize {
        self.counts.get(host).copied().unwrap_or(0)
    }

    /// The `n` most frequent hosts, ties broken by host name.
    pub fn top(&self, n: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> =
            self.counts.iter().map(|(h, c)| (h.as_str(), *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sorts one channel's links by descending host frequency, then host name.
    ///
    /// The sort is stable, so links on the same host keep their order.
    pub fn sort_channels(&self, channels: &mut [Channel]) {
        channels.sort_by_cached_key(|c| {
            let host = extract_host_key(c.url());
            (Reverse(self.frequency(&host)), host)
        });
    }

    /// Applies [`sort_channels`](Self::sort_channels) to every channel bucket
    /// independently.
    pub fn rank_results(&self, results: &mut AggregateResults) {
        for group in results.groups_mut() {
            for bucket in &mut group.channels {
                self.sort_channels(&mut bucket.links);
            }
        }
    }
}
