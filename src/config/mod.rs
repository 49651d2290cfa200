//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, caps, output markers, etc.)
//! - Browser request header constants
//! - CLI option types and the run-scoped configs derived from them

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{BatchConfig, Config, LogFormat, LogLevel, ProbePolicy, SearchConfig, SpeedPolicy};
