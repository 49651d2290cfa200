//! User-Agent pools for search requests.
//!
//! Portals throttle clients that repeat one identity, so every search request
//! picks a User-Agent from the desktop or mobile pool. The choice is applied to
//! the individual request, never to the shared client.

use rand::seq::IndexedRandom;

use crate::config::DEFAULT_USER_AGENT;

/// Desktop browser identities.
pub const DESKTOP_USER_AGENTS: &[&str] = &[
    DEFAULT_USER_AGENT,
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Mobile browser identities.
pub const MOBILE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 13; SM-G991B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
];

/// Picks a random User-Agent from the mobile or desktop pool.
pub fn random_user_agent(mobile: bool) -> &'static str {
    let pool = if mobile {
        MOBILE_USER_AGENTS
    } else {
        DESKTOP_USER_AGENTS
    };
    pool.choose(&mut rand::rng())
        .copied()
        .unwrap_or(DEFAULT_USER_AGENT)
}
