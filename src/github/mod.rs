//! GitHub REST API surface: search pagination, releases, README metadata.

pub mod link;
pub mod search;
pub mod types;

pub use search::GitHubApi;
pub use types::{Owner, ReadmeInfo, Release, ReleaseAsset, SearchItem, SearchPage};
