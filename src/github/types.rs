use serde::{Deserialize, Serialize};

/// One page of repository search results.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub total_count: u64,
    pub items: Vec<SearchItem>,
}

/// A repository summary as returned by the search API.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SearchItem {
    pub full_name: String,
    pub name: String,
    pub owner: Owner,
    #[serde(default)]
    pub topics: Vec<String>,
    pub description: Option<String>,
    pub releases_url: String,
    pub default_branch: String,
    pub html_url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Owner {
    pub login: String,
    pub html_url: String,
    pub avatar_url: String,
}

/// Latest-release metadata. `assets` stays optional: the endpoint can answer
/// without an asset list, which is a skip condition rather than an error.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Release {
    pub assets: Option<Vec<ReleaseAsset>>,
}

/// A single downloadable file attached to a release.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ReleaseAsset {
    pub name: String,
    pub content_type: String,
    pub created_at: String,
    pub updated_at: String,
    pub browser_download_url: String,
    pub size: u64,
    pub download_count: u64,
}

/// Response of the README metadata endpoint, reduced to the one field the
/// fallback lookup needs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ReadmeInfo {
    pub download_url: Option<String>,
}
