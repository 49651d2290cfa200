//! Statistics printing.

use log::info;
use std::path::Path;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats, WarningType};

/// Prints a simple one-line summary of the run.
///
/// Works with both plain and JSON log formats (log::info! handles formatting).
pub fn print_summary(
    channels: usize,
    channels_with_links: usize,
    links_written: usize,
    output: &Path,
    elapsed_seconds: f64,
) {
    info!(
        "✅ Searched {} channel{} ({} with links), wrote {} link{} to {} in {:.1}s",
        channels,
        if channels == 1 { "" } else { "s" },
        channels_with_links,
        links_written,
        if links_written == 1 { "" } else { "s" },
        output.display(),
        elapsed_seconds
    );
}

/// Prints error, warning, and info statistics to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_warnings = error_stats.total_warnings();
    let total_info = error_stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_warnings > 0 {
        info!("Warning Counts ({} total):", total_warnings);
        for warning_type in WarningType::iter() {
            let count = error_stats.get_warning_count(warning_type);
            if count > 0 {
                info!("   {}: {}", warning_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}
