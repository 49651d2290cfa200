//! Channel list input and playlist output.
//!
//! This module provides:
//! - Parsing of the grouped channel list the run is driven by
//! - Formatting of the aggregate results as a `name,url` playlist
//! - Async file reading and writing

mod input;
mod writer;

pub use input::{parse_channel_list, read_channel_file};
pub use writer::{format_playlist, timestamp_label, write_playlist, Playlist};
