//! Retry policy for API requests: one bounded retry with a server-directed delay.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Fallback delay before the single retry when the server gives no hint.
pub const RETRY_FALLBACK_SECS: u64 = 180;

/// A request that came back non-2xx, with enough context to log and to
/// decide how long to wait before the retry.
#[derive(Debug)]
pub struct TransportError {
    pub status: u16,
    pub url: String,
    pub body: String,
    /// Parsed `Retry-After` header (seconds), if the server sent one.
    pub retry_after: Option<u64>,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} from {}", self.status, self.url)
    }
}

impl std::error::Error for TransportError {}

/// Extracts the `Retry-After` delay from response headers.
/// Only the delta-seconds form is honored; HTTP-date values are ignored.
pub fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Delay to wait before retrying a failed request: the server's hint when
/// present, the fixed fallback otherwise.
pub fn retry_delay(error: &anyhow::Error) -> Duration {
    let secs = error
        .downcast_ref::<TransportError>()
        .and_then(|e| e.retry_after)
        .unwrap_or(RETRY_FALLBACK_SECS);
    Duration::from_secs(secs)
}
