//! Utility functions shared by the site plugins.
//!
//! This module provides:
//! - Error retriability determination for page fetches
//! - CSS selector parsing and element text helpers

mod retry;
mod selector;

pub(crate) use retry::is_retriable_error;
pub use selector::{element_text, parse_selector_with_fallback};
