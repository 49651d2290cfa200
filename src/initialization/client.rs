//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::DEFAULT_USER_AGENT;

/// Upper bound on establishing a TCP/TLS connection, below the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Initializes the HTTP client a searcher uses for search pages and probes.
///
/// Creates a `reqwest::Client` configured with:
/// - Request timeout from the search configuration
/// - A cookie store, so warm-up visits carry session cookies into searches
/// - Certificate verification disabled (portals and stream hosts routinely
///   serve self-signed or expired certificates)
/// - A default User-Agent; searchers override it per request
///
/// The client is never mutated after construction; per-request identity is
/// set on each request builder.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .cookie_store(true)
        .danger_accept_invalid_certs(true)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
}
