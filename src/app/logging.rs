//! Progress logging utilities.

use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Logs progress information about channel processing.
///
/// # Arguments
///
/// * `start_time` - The start time of processing
/// * `completed_channels` - Atomic counter of finished channels
/// * `total_channels` - Channels in the input list
pub fn log_progress(
    start_time: std::time::Instant,
    completed_channels: &Arc<AtomicUsize>,
    total_channels: usize,
) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = completed_channels.load(Ordering::SeqCst);
    let percent = if total_channels > 0 {
        completed as f64 * 100.0 / total_channels as f64
    } else {
        100.0
    };
    info!(
        "Processed {}/{} channels ({:.0}%) in {:.1} seconds",
        completed, total_channels, percent, elapsed_secs
    );
}
