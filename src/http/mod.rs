//! HTTP plumbing: shared client and the retry policy.

pub mod client;
pub mod retry;

pub use client::HttpClient;
pub use retry::{RETRY_FALLBACK_SECS, TransportError};
