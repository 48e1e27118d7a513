//! GitHub API access: repository search, latest releases, README metadata.

use anyhow::{Context, Result};
use log::debug;

use crate::http::HttpClient;

use super::link;
use super::types::{ReadmeInfo, Release, SearchPage};

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Client for the GitHub REST API endpoints this crawler touches.
pub struct GitHubApi {
    http: HttpClient,
    api_url: String,
}

impl GitHubApi {
    pub fn new(http: HttpClient, api_url: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { http, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Runs a repository search and follows `rel="next"` links until the
    /// last page. Pages come back in fetch order; each is fetched once.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchPage>> {
        let url = format!("{}/search/repositories", self.api_url);
        let mut response = self
            .http
            .fetch(&url, &[("q", query), ("sort", "updated")], true)
            .await?;

        let mut pages = Vec::new();
        loop {
            let next = response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(link::next_url);

            let page: SearchPage = response
                .json()
                .await
                .context("Failed to parse search response")?;
            debug!("Search page {} with {} items", pages.len() + 1, page.items.len());
            pages.push(page);

            match next {
                // The next-page URL already carries the query parameters.
                Some(next_url) => response = self.http.fetch(&next_url, &[], true).await?,
                None => break,
            }
        }

        Ok(pages)
    }

    /// Resolves a `releases_url` template to its latest-release endpoint and
    /// fetches the release metadata.
    #[tracing::instrument(skip(self))]
    pub async fn latest_release(&self, releases_url: &str) -> Result<Release> {
        let url = releases_url.replace("{/id}", "/latest");
        let response = self.http.fetch(&url, &[], true).await?;
        response
            .json()
            .await
            .context("Failed to parse latest release response")
    }

    /// Fetches the README metadata record for a repository. This is a
    /// fallback lookup, so it is issued without retry.
    #[tracing::instrument(skip(self))]
    pub async fn readme_meta(&self, full_name: &str) -> Result<ReadmeInfo> {
        let url = format!("{}/repos/{}/readme", self.api_url, full_name);
        let response = self.http.fetch(&url, &[], false).await?;
        response
            .json()
            .await
            .context("Failed to parse readme metadata response")
    }
}
