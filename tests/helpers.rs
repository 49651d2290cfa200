// Shared test helpers for channel list files and test configs.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::io::Write;
use std::path::{Path, PathBuf};

use iptv_scout::config::SpeedPolicy;
use iptv_scout::{Config, LogFormat, LogLevel};
use tempfile::NamedTempFile;

/// Writes a channel list to a temporary file.
pub fn write_channel_list(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(text.as_bytes())
        .expect("Failed to write channel list");
    file.flush().expect("Failed to flush file");
    file
}

/// Creates a Config with every pacing delay switched off.
pub fn create_test_config(input: &Path, output: PathBuf, searcher: &str) -> Config {
    Config {
        input: input.to_path_buf(),
        output,
        searcher: searcher.to_string(),
        log_level: LogLevel::Error, // Reduce noise in tests
        log_format: LogFormat::Plain,
        max_results: 8,
        min_valid_links: 3,
        max_pages: 3,
        timeout_seconds: 5,
        probe_timeout_secs: 2,
        min_speed_kbps: 0,
        speed_policy: SpeedPolicy::LogOnly,
        max_workers_per_group: 2,
        channel_delay_min: 0.0,
        channel_delay_max: 0.0,
        request_delay_min: 0.0,
        request_delay_max: 0.0,
        min_request_interval_secs: 0.0,
        max_retries: 1,
        ..Config::default()
    }
}

/// Reads the playlist back as lines.
#[allow(dead_code)] // Used by other test files
pub fn read_rows(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read playlist")
        .lines()
        .map(str::to_string)
        .collect()
}
