//! HTTP header constants.
//!
//! Browser-like request headers sent with search requests so portals see
//! something resembling a regular page load.

/// Accept header for HTML page requests
pub const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
/// Accept-Language header preferring Chinese, as the portals are Chinese-language
pub const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";
/// Form content type used by POST search forms
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Static navigation headers attached to every search request.
///
/// The User-Agent, Referer and Origin are added per request by the searcher.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("Accept", ACCEPT_HTML),
    ("Accept-Language", ACCEPT_LANGUAGE),
    ("DNT", "1"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
    ("Cache-Control", "max-age=0"),
];
