//! Channel list parsing.
//!
//! Format:
//! ```text
//! #News
//! CCTV-1
//! CCTV-2
//!
//! #Local
//! BTV
//! ```
//! A `#` line opens a group named by the rest of the line. Plain lines name
//! channels of the current group. Lines before the first group line belong to
//! [`DEFAULT_GROUP_NAME`]. Groups that end up without channels are dropped.

use std::path::Path;

use anyhow::{Context, Result};

use crate::channel::ChannelGroup;
use crate::config::{DEFAULT_GROUP_NAME, GROUP_LINE_MARKER};

/// Parses a channel list into ordered groups.
pub fn parse_channel_list(text: &str) -> Vec<ChannelGroup> {
    let mut groups: Vec<ChannelGroup> = Vec::new();
    let mut current: Option<ChannelGroup> = None;

    for line in text.lines() {
        // A UTF-8 BOM sticks to the first line of files saved on Windows.
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix(GROUP_LINE_MARKER) {
            groups.extend(current.take());
            current = Some(ChannelGroup::new(name.trim(), Vec::new()));
            continue;
        }

        current
            .get_or_insert_with(|| ChannelGroup::new(DEFAULT_GROUP_NAME, Vec::new()))
            .channels
            .push(line.to_string());
    }
    groups.extend(current);

    groups.retain(|g| {
        if g.channels.is_empty() {
            log::debug!("Skipping group {} without channels", g.name);
        }
        !g.channels.is_empty()
    });
    groups
}

/// Reads and parses a channel list file.
pub async fn read_channel_file(path: &Path) -> Result<Vec<ChannelGroup>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read channel list: {}", path.display()))?;
    let groups = parse_channel_list(&text);
    log::info!(
        "Loaded {} groups ({} channels) from {}",
        groups.len(),
        groups.iter().map(|g| g.channels.len()).sum::<usize>(),
        path.display()
    );
    Ok(groups)
}
