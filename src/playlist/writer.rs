//! Playlist formatting and writing.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};

use crate::batch::AggregateResults;
use crate::config::{
    GROUP_HEADER_MARKER, PLACEHOLDER_URL, TIMESTAMP_FORMAT, TIMESTAMP_LABEL_TEMPLATE,
    TIMESTAMP_UTC_OFFSET_HOURS,
};

/// Rendered playlist text plus the number of `name,url` rows it contains
/// (the timestamp row included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub text: String,
    pub links: usize,
}

/// Renders the label of the timestamp row, e.g. `更新时间(2024-05-01 20:30)`,
/// in Beijing time.
pub fn timestamp_label(now: DateTime<Utc>) -> String {
    let formatted = match FixedOffset::east_opt(TIMESTAMP_UTC_OFFSET_HOURS * 3600) {
        Some(offset) => now.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string(),
        None => now.format(TIMESTAMP_FORMAT).to_string(),
    };
    TIMESTAMP_LABEL_TEMPLATE.replace("{}", &formatted)
}

/// Formats the aggregate result set as a `name,url` playlist.
///
/// Groups and channels keep their input order. Channels without links are
/// skipped, and so are groups without any link. The timestamp row follows
/// the first emitted group header and points at the first link of the whole
/// result set. When nothing was found at all, the first group's header and a
/// timestamp row with [`PLACEHOLDER_URL`] are still written so the file
/// records the run.
pub fn format_playlist(results: &AggregateResults, timestamp_label: &str) -> Playlist {
    let first_url = results.first_url().unwrap_or(PLACEHOLDER_URL);
    let mut text = String::new();
    let mut links = 0usize;
    let mut timestamp_written = false;

    for group in results.groups() {
        if group.total_links() == 0 {
            for channel in &group.channels {
                log::info!("Skipping {} / {}: no valid links", group.name, channel.name);
            }
            continue;
        }

        let _ = writeln!(text, "{},{}", group.name, GROUP_HEADER_MARKER);
        if !timestamp_written {
            let _ = writeln!(text, "{},{}", timestamp_label, first_url);
            links += 1;
            timestamp_written = true;
        }

        for channel in &group.channels {
            if channel.is_empty() {
                log::info!("Skipping {} / {}: no valid links", group.name, channel.name);
                continue;
            }
            for link in &channel.links {
                let _ = writeln!(text, "{},{}", channel.name, link.url());
                links += 1;
            }
            log::debug!("Wrote {} links for {}", channel.links.len(), channel.name);
        }
    }

    if !timestamp_written {
        if let Some(group) = results.groups().first() {
            let _ = writeln!(text, "{},{}", group.name, GROUP_HEADER_MARKER);
            let _ = writeln!(text, "{},{}", timestamp_label, first_url);
            links += 1;
        }
    }

    Playlist { text, links }
}

/// Writes a formatted playlist to `path`, replacing any existing file.
pub async fn write_playlist(path: &Path, playlist: &Playlist) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    tokio::fs::write(path, playlist.text.as_bytes())
        .await
        .with_context(|| format!("Failed to write playlist: {}", path.display()))?;
    log::info!("Wrote {} links to {}", playlist.links, path.display());
    Ok(())
}
