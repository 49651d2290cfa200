//! CSS selector parsing utilities.

use scraper::Selector;

/// Parses a CSS selector with a safe fallback.
///
/// If parsing fails, logs an error and returns a selector that matches nothing
/// (`*:not(*)`), so a bad selector degrades to "no candidates" instead of a panic.
///
/// * `selector_str` - The CSS selector string to parse
/// * `context` - Where the selector is used, for the error log
pub fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Option<Selector> {
    match Selector::parse(selector_str) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::error!(
                "Failed to parse CSS selector '{}' in {}: {}. Matching nothing.",
                selector_str,
                context,
                e
            );
            Selector::parse("*:not(*)").ok()
        }
    }
}

/// Collects the trimmed, whitespace-collapsed text of an element.
pub fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
