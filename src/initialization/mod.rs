//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - HTTP clients for the site plugins
//! - The logger
//! - Concurrency semaphores

mod client;
mod logger;

use std::sync::Arc;

use tokio::sync::Semaphore;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Initializes a semaphore for controlling concurrency.
///
/// Used both for the run-wide network budget and for the per-group channel
/// worker ceiling.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count))
}
