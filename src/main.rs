use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use nar_station::config::Config;
use nar_station::crawler::{Crawler, NarClassifier};
use nar_station::github::GitHubApi;
use nar_station::http::HttpClient;
use nar_station::site::Renderer;

const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// nar-station - static catalog generator for ukagaka packages
///
/// Searches GitHub for repositories tagged with ukagaka-* topics, resolves
/// their latest release archives and readmes, and renders a static site.
///
/// If the GITHUB_TOKEN environment variable is set, it will be used for
/// authentication. This raises the search API rate limits considerably.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Configuration file (search query, redirects, site metadata)
    #[arg(
        long = "config",
        short = 'c',
        env = "NAR_STATION_CONFIG",
        value_name = "PATH",
        default_value = "config.json"
    )]
    config: PathBuf,

    /// Output directory for the rendered site
    #[arg(
        long = "output",
        short = 'o',
        env = "NAR_STATION_OUTPUT",
        value_name = "PATH",
        default_value = "site"
    )]
    output: PathBuf,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL")]
    api_url: Option<String>,

    /// Raw content URL (defaults to https://raw.githubusercontent.com)
    #[arg(long = "raw-url", value_name = "URL")]
    raw_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    let http = HttpClient::from_env()?;
    let github = GitHubApi::new(http.clone(), cli.api_url);

    let pages = github.search(&config.query).await?;
    info!(
        "Search returned {} page(s) for {:?}",
        pages.len(),
        config.query
    );

    let classifier = NarClassifier::new(
        github,
        http,
        config.redirect,
        cli.raw_url.unwrap_or_else(|| DEFAULT_RAW_URL.to_string()),
    );
    let catalog = Crawler::new(classifier).run(&pages).await?;
    info!(
        "Classified {} entries across {} categories and {} authors",
        catalog.entries.len(),
        catalog.categories.len(),
        catalog.authors.len()
    );

    let renderer = Renderer::new(config.site)?;
    renderer.render_site(&cli.output, &catalog)?;
    info!("Site written to {}", cli.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["nar-station"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.output, PathBuf::from("site"));
        assert_eq!(cli.api_url, None);
        assert_eq!(cli.raw_url, None);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "nar-station",
            "--config",
            "/tmp/c.json",
            "--output",
            "/tmp/out",
            "--api-url",
            "http://127.0.0.1:8080",
            "--raw-url",
            "http://127.0.0.1:8081",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/c.json"));
        assert_eq!(cli.output, PathBuf::from("/tmp/out"));
        assert_eq!(cli.api_url, Some("http://127.0.0.1:8080".to_string()));
        assert_eq!(cli.raw_url, Some("http://127.0.0.1:8081".to_string()));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::try_parse_from(["nar-station", "-c", "x.json", "-o", "www"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("x.json"));
        assert_eq!(cli.output, PathBuf::from("www"));
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["nar-station", "--frobnicate"]).is_err());
    }
}
