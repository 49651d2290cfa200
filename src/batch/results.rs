//! Aggregate result set of a batch run.
//!
//! The shape mirrors the input: ordered groups, each holding ordered channel
//! buckets, each holding that channel's links. Order is never derived from
//! completion order.

use serde::Serialize;

use crate::channel::Channel;

/// Links found for one requested channel name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChannelResult {
    /// Channel name as requested in the input list
    pub name: String,
    pub links: Vec<Channel>,
}

impl ChannelResult {
    pub fn new(name: impl Into<String>, links: Vec<Channel>) -> Self {
        ChannelResult {
            name: name.into(),
            links,
        }
    }

    /// A bucket for a channel whose search produced nothing (or failed).
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Results of one input group, channels in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupResult {
    pub name: String,
    pub channels: Vec<ChannelResult>,
}

impl GroupResult {
    pub fn new(name: impl Into<String>, channels: Vec<ChannelResult>) -> Self {
        GroupResult {
            name: name.into(),
            channels,
        }
    }

    pub fn total_links(&self) -> usize {
        self.channels.iter().map(|c| c.links.len()).sum()
    }
}

/// Ordered groups of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateResults {
    groups: Vec<GroupResult>,
}

impl AggregateResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_group(&mut self, group: GroupResult) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[GroupResult] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [GroupResult] {
        &mut self.groups
    }

    /// Links of `channel` inside `group`, if both exist.
    pub fn get(&self, group: &str, channel: &str) -> Option<&[Channel]> {
        self.groups
            .iter()
            .find(|g| g.name == group)?
            .channels
            .iter()
            .find(|c| c.name == channel)
            .map(|c| c.links.as_slice())
    }

    /// Every link of every bucket, in output order.
    pub fn iter_links(&self) -> impl Iterator<Item = &Channel> {
        self.groups
            .iter()
            .flat_map(|g| g.channels.iter())
            .flat_map(|c| c.links.iter())
    }

    /// URL of the first link anywhere in the result set.
    pub fn first_url(&self) -> Option<&str> {
        self.iter_links().next().map(Channel::url)
    }

    pub fn total_links(&self) -> usize {
        self.groups.iter().map(GroupResult::total_links).sum()
    }

    /// Number of requested channels across all groups.
    pub fn channel_count(&self) -> usize {
        self.groups.iter().map(|g| g.channels.len()).sum()
    }

    /// Number of requested channels with at least one link.
    pub fn channels_with_links(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.channels.iter())
            .filter(|c| !c.is_empty())
            .count()
    }
}
