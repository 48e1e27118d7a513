//! The normalized record rendered for one qualifying repository release.

use serde::Serialize;

/// README text used when every lookup path came up empty.
pub const README_FALLBACK: &str = "readme.txt not found";

/// URI scheme consumed by baseware installers.
const INSTALL_SCHEME: &str = "x-ukagaka-link:type=install&url=";

/// One render-ready catalog entry. Immutable once built; field names are
/// the template vocabulary.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub category: String,
    pub author: String,
    pub author_url: String,
    pub author_avatar_url: String,
    pub html_url: String,
    pub content_type: String,
    pub created_at_time: String,
    pub created_at_str: String,
    pub created_at_rss2: String,
    pub updated_at_time: String,
    pub updated_at_str: String,
    pub updated_at_rss2: String,
    pub browser_download_url: String,
    pub install_uri: String,
    pub filesize: String,
    pub size: u64,
    pub download_count: u64,
    pub readme: String,
    pub description: String,
    pub topics: Vec<String>,
}

/// Page-unique identifier for a repository, `owner/name` with the slash
/// flattened.
pub fn slug(full_name: &str) -> String {
    full_name.replace('/', "_")
}

/// Install link for an asset: the custom scheme with the download URL
/// percent-encoded into the query value.
pub fn install_uri(download_url: &str) -> String {
    format!("{}{}", INSTALL_SCHEME, urlencoding::encode(download_url))
}

/// Asset size in KiB with one decimal place. Ties round half-even, matching
/// decimal quantization rather than binary float rounding.
pub fn filesize_kib(bytes: u64) -> String {
    let scaled = bytes * 10;
    let mut tenths = scaled / 1024;
    let rem = scaled % 1024;
    if rem > 512 || (rem == 512 && tenths % 2 == 1) {
        tenths += 1;
    }
    format!("{}.{}", tenths / 10, tenths % 10)
}
