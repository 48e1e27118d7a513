//! Per-item classification and enrichment of search results.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::config::Redirect;
use crate::entry::{Entry, README_FALLBACK, filesize_kib, install_uri, slug};
use crate::github::{GitHubApi, SearchItem, SearchPage};
use crate::http::HttpClient;
use crate::timestamp;

/// Topic prefix marking repositories that belong to this taxonomy.
pub const TOPIC_PREFIX: &str = "ukagaka-";

/// Categories a repository may be listed under, in no particular priority;
/// the first topic tag that survives this allow-list wins.
pub const ALLOWED_CATEGORIES: [&str; 5] = ["ghost", "shell", "balloon", "plugin", "supplement"];

/// Content types accepted as an installable archive. The first type is the
/// canonical one; the rest are what release authors upload in practice.
pub const INSTALLABLE_CONTENT_TYPES: [&str; 4] = [
    "application/x-nar",
    "application/zip",
    "application/x-zip-compressed",
    "application/octet-stream",
];

/// Classification capability: turn one raw search item into a catalog entry,
/// or decide to skip it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Classify: Send + Sync {
    /// `Ok(None)` means the item was skipped (logged, never escalated);
    /// `Err` means a transport failure that aborts the run.
    async fn classify(&self, item: &SearchItem) -> Result<Option<Entry>>;
}

/// Classifier for NAR-packaged repositories: extracts the category from
/// topic tags, resolves the latest release asset, and attaches the readme.
pub struct NarClassifier {
    github: GitHubApi,
    http: HttpClient,
    redirect: HashMap<String, Redirect>,
    raw_url: String,
}

impl NarClassifier {
    pub fn new(
        github: GitHubApi,
        http: HttpClient,
        redirect: HashMap<String, Redirect>,
        raw_url: String,
    ) -> Self {
        Self {
            github,
            http,
            redirect,
            raw_url,
        }
    }

    /// Direct text fetch, decoded per the response's declared charset.
    /// No retry: readme sources are best-effort.
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.http.fetch(url, &[], false).await?;
        response.text().await.context("Failed to decode response body")
    }

    /// Readme lookup chain: redirect override or the raw-content convention
    /// URL first, then the README metadata endpoint, then the fallback text.
    /// Never fails the item.
    async fn resolve_readme(&self, item: &SearchItem) -> String {
        let url = match self
            .redirect
            .get(&item.full_name)
            .and_then(|r| r.readme.as_deref())
        {
            Some(redirected) => {
                debug!(
                    "README file is redirected from {} to {}",
                    item.full_name, redirected
                );
                redirected.to_string()
            }
            None => format!(
                "{}/{}/{}/readme.txt",
                self.raw_url, item.full_name, item.default_branch
            ),
        };

        match self.fetch_text(&url).await {
            Ok(text) => text,
            Err(e) => {
                debug!(
                    "readme.txt fetch failed for {} ({}), falling back to metadata endpoint",
                    item.full_name, e
                );
                self.readme_from_metadata(item).await
            }
        }
    }

    async fn readme_from_metadata(&self, item: &SearchItem) -> String {
        let download_url = match self.github.readme_meta(&item.full_name).await {
            Ok(info) => info.download_url,
            Err(e) => {
                debug!("README metadata lookup failed for {} ({})", item.full_name, e);
                None
            }
        };

        match download_url {
            Some(url) => match self.fetch_text(&url).await {
                Ok(text) => {
                    debug!("README is found at {} in {}", url, item.full_name);
                    text
                }
                Err(e) => {
                    debug!("README download failed for {} ({})", item.full_name, e);
                    README_FALLBACK.to_string()
                }
            },
            None => {
                debug!("README is not found in {}", item.full_name);
                README_FALLBACK.to_string()
            }
        }
    }
}

#[async_trait]
impl Classify for NarClassifier {
    #[tracing::instrument(skip(self, item), fields(repo = %item.full_name))]
    async fn classify(&self, item: &SearchItem) -> Result<Option<Entry>> {
        let tagged: Vec<&str> = item
            .topics
            .iter()
            .filter_map(|t| t.strip_prefix(TOPIC_PREFIX))
            .collect();
        if tagged.is_empty() {
            debug!("{}* topic is not found in {}", TOPIC_PREFIX, item.full_name);
            return Ok(None);
        }

        let Some(category) = tagged
            .iter()
            .find(|t| ALLOWED_CATEGORIES.contains(*t))
            .map(|t| t.to_string())
        else {
            debug!("{}* topic is not allowed in {}", TOPIC_PREFIX, item.full_name);
            return Ok(None);
        };

        let mut releases_url = item.releases_url.clone();
        if let Some(target) = self
            .redirect
            .get(&item.full_name)
            .and_then(|r| r.nar.as_deref())
        {
            debug!(
                "releases_url is redirected from {} to {}",
                item.full_name, target
            );
            releases_url = releases_url.replace(&item.full_name, target);
        }

        let release = self.github.latest_release(&releases_url).await?;
        let Some(assets) = release.assets else {
            debug!("assets are not found in {}", item.full_name);
            return Ok(None);
        };

        let Some(asset) = assets
            .iter()
            .find(|a| INSTALLABLE_CONTENT_TYPES.contains(&a.content_type.as_str()))
        else {
            debug!("NAR file is not found in {}", item.full_name);
            if let Some(first) = assets.first() {
                debug!("content_type: {}", first.content_type);
            }
            return Ok(None);
        };

        let created = timestamp::convert(&asset.created_at)?;
        let updated = timestamp::convert(&asset.updated_at)?;
        let readme = self.resolve_readme(item).await;

        Ok(Some(Entry {
            id: slug(&item.full_name),
            title: item.name.clone(),
            category,
            author: item.owner.login.clone(),
            author_url: item.owner.html_url.clone(),
            author_avatar_url: item.owner.avatar_url.clone(),
            html_url: item.html_url.clone(),
            content_type: asset.content_type.clone(),
            created_at_time: created.time,
            created_at_str: created.display,
            created_at_rss2: created.rss2,
            updated_at_time: updated.time,
            updated_at_str: updated.display,
            updated_at_rss2: updated.rss2,
            browser_download_url: asset.browser_download_url.clone(),
            install_uri: install_uri(&asset.browser_download_url),
            filesize: filesize_kib(asset.size),
            size: asset.size,
            download_count: asset.download_count,
            readme,
            description: item.description.clone().unwrap_or_default(),
            topics: item.topics.clone(),
        }))
    }
}

/// Drives classification over every discovered item, in page order, and
/// aggregates the survivors. Strictly sequential: one item's requests finish
/// before the next item starts.
pub struct Crawler<C> {
    classifier: C,
}

impl<C: Classify> Crawler<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    pub async fn run(&self, pages: &[SearchPage]) -> Result<Catalog> {
        let mut catalog = Catalog::default();
        for page in pages {
            for item in &page.items {
                if let Some(entry) = self.classifier.classify(item).await? {
                    catalog.push(entry);
                }
            }
        }
        Ok(catalog)
    }
}
