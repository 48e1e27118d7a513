//! HTTP client wrapper shared by every fetch in a run.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use std::env;

use super::retry::{TransportError, retry_after, retry_delay};

const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const AGENT: &str = "nar-station";

/// Thin wrapper over [`reqwest::Client`] that owns the retry policy: one
/// bounded retry per request, delayed by the server's `Retry-After` hint.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the process-wide client with the API headers pinned and the
    /// bearer token taken from `GITHUB_TOKEN` when present.
    pub fn from_env() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static(AGENT));
        if let Ok(token) = env::var("GITHUB_TOKEN") {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            if token.len() > 12 {
                debug!(
                    "Using GITHUB_TOKEN for authentication: {}*********{}",
                    &token[..8],
                    &token[token.len() - 4..]
                );
            }
        }

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request. On failure, when `allow_retry` is set, waits
    /// for the server's `Retry-After` hint (fallback 180s) and repeats the
    /// request exactly once; the second failure propagates.
    #[tracing::instrument(skip(self, query))]
    pub async fn fetch(
        &self,
        url: &str,
        query: &[(&str, &str)],
        allow_retry: bool,
    ) -> Result<Response> {
        debug!("GET {} with query {:?}...", url, query);

        match self.fetch_once(url, query).await {
            Ok(response) => Ok(response),
            Err(e) if allow_retry => {
                let delay = retry_delay(&e);
                warn!(
                    "GET {} failed ({}), retrying once in {}s...",
                    url,
                    e,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
                self.fetch_once(url, query).await
            }
            Err(e) => Err(e),
        }
    }

    /// Single GET attempt. Non-2xx responses are drained for their body and
    /// surfaced as [`TransportError`].
    async fn fetch_once(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let hint = retry_after(response.headers());
        let final_url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        warn!("GET {} returned {}: {}", final_url, status, body);

        Err(anyhow::Error::from(TransportError {
            status: status.as_u16(),
            url: final_url,
            body,
            retry_after: hint,
        }))
    }
}
