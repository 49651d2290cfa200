//! Error retriability for search page requests.

use crate::config::HTTP_STATUS_TOO_MANY_REQUESTS;
use crate::error_handling::FetchError;

/// Determines if a failed page fetch should be retried.
///
/// # Retriable
///
/// - Network timeouts, connection failures and request errors
/// - Server errors (5xx) and rate limiting (429)
/// - Short responses, which portals serve as anti-bot interstitials
///
/// # Not retriable
///
/// - Client errors (4xx other than 429)
/// - Redirect and decode errors
pub(crate) fn is_retriable_error(error: &FetchError) -> bool {
    match error {
        FetchError::ContentTooShort { .. } => true,
        FetchError::BudgetClosed => false,
        FetchError::Status(code) => is_retriable_status(*code),
        FetchError::Http(e) => {
            if let Some(status) = e.status() {
                return is_retriable_status(status.as_u16());
            }
            if e.is_redirect() || e.is_decode() || e.is_builder() {
                return false;
            }
            e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
        }
    }
}

fn is_retriable_status(code: u16) -> bool {
    code == HTTP_STATUS_TOO_MANY_REQUESTS || (500..600).contains(&code)
}
