//! Run configuration, loaded once before any network activity.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Process-wide configuration, read-only after load.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Search query handed to the repository search endpoint.
    pub query: String,
    /// Repository full name -> override source locations.
    #[serde(default)]
    pub redirect: HashMap<String, Redirect>,
    pub site: Site,
}

/// Override locations for a repository whose canonical data has moved.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Redirect {
    /// Replacement `owner/repo` substituted into the releases URL.
    pub nar: Option<String>,
    /// Replacement URL fetched instead of the conventional readme location.
    pub readme: Option<String>,
}

/// Metadata for the rendered site. Serializable because it is part of the
/// data object handed to templates.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Site {
    pub title: String,
    /// Absolute URL the site is served from, without a trailing slash.
    pub base_url: String,
}

impl Config {
    /// Loads configuration from a JSON file. Any failure here is fatal for
    /// the run and happens before the first request.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
