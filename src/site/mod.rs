//! Static site generation from an aggregated catalog.

use anyhow::{Context, Result};
use chrono::Utc;
use handlebars::Handlebars;
use log::debug;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::catalog::Catalog;
use crate::config::Site;
use crate::entry::Entry;
use crate::timestamp;

const PAGE_TEMPLATE: &str = "index";
const FEED_TEMPLATE: &str = "rss2";
const SITEMAP_TEMPLATE: &str = "sitemap";

/// Renders listing pages, feeds and the sitemap into an output directory.
/// Every file is fully overwritten; category and author directories are
/// replaced wholesale so removed entries leave nothing behind.
pub struct Renderer {
    handlebars: Handlebars<'static>,
    site: Site,
}

impl Renderer {
    pub fn new(site: Site) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars
            .register_template_string(PAGE_TEMPLATE, include_str!("templates/index.hbs"))
            .context("Failed to register listing template")?;
        handlebars
            .register_template_string(FEED_TEMPLATE, include_str!("templates/rss2.hbs"))
            .context("Failed to register feed template")?;
        handlebars
            .register_template_string(SITEMAP_TEMPLATE, include_str!("templates/sitemap.hbs"))
            .context("Failed to register sitemap template")?;
        Ok(Self { handlebars, site })
    }

    /// Writes the whole site: the top-level listing and feed, one
    /// listing/feed pair per category and per author, and the sitemap.
    #[tracing::instrument(skip(self, catalog))]
    pub fn render_site(&self, out: &Path, catalog: &Catalog) -> Result<()> {
        fs::create_dir_all(out)
            .with_context(|| format!("Failed to create output directory {}", out.display()))?;

        let all: Vec<&Entry> = catalog.entries.iter().collect();
        self.write_listing(out, "", &self.site.title, &all, catalog)?;

        for category in &catalog.categories {
            let dir = out.join(category);
            replace_dir(&dir)?;
            self.write_listing(
                &dir,
                &format!("{category}/"),
                &format!("{} / {category}", self.site.title),
                &catalog.by_category(category),
                catalog,
            )?;
        }

        let authors_root = out.join("author");
        replace_dir(&authors_root)?;
        for author in &catalog.authors {
            let dir = authors_root.join(author);
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            self.write_listing(
                &dir,
                &format!("author/{author}/"),
                &format!("{} / {author}", self.site.title),
                &catalog.by_author(author),
                catalog,
            )?;
        }

        self.write_sitemap(out, catalog)
    }

    /// Renders the listing page and its feed for one scope (everything, one
    /// category, or one author). `path` is the scope's site-relative prefix.
    fn write_listing(
        &self,
        dir: &Path,
        path: &str,
        heading: &str,
        entries: &[&Entry],
        catalog: &Catalog,
    ) -> Result<()> {
        debug!("Rendering {} entries under /{}", entries.len(), path);
        let data = json!({
            "site": &self.site,
            "heading": heading,
            "path": path,
            "entries": entries,
            "categories": &catalog.categories,
            "authors": &catalog.authors,
        });

        self.write_rendered(&dir.join("index.html"), PAGE_TEMPLATE, &data)?;
        self.write_rendered(&dir.join("rss2.xml"), FEED_TEMPLATE, &data)
    }

    fn write_sitemap(&self, out: &Path, catalog: &Catalog) -> Result<()> {
        let mut pages = vec![String::new()];
        pages.extend(catalog.categories.iter().map(|c| format!("{c}/")));
        pages.extend(catalog.authors.iter().map(|a| format!("author/{a}/")));

        let generated = Utc::now()
            .with_timezone(&timestamp::display_offset())
            .format("%Y-%m-%d")
            .to_string();
        let data = json!({
            "site": &self.site,
            "pages": pages,
            "generated": generated,
        });

        self.write_rendered(&out.join("sitemap.xml"), SITEMAP_TEMPLATE, &data)
    }

    fn write_rendered(&self, path: &Path, template: &str, data: &serde_json::Value) -> Result<()> {
        let mut text = self
            .handlebars
            .render(template, data)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Deletes a directory tree if present and recreates it empty.
fn replace_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to remove {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn site() -> Site {
        Site {
            title: "NAR Station".to_string(),
            base_url: "https://nar.example.com".to_string(),
        }
    }

    fn entry(id: &str, category: &str, author: &str) -> Entry {
        Entry {
            id: id.to_string(),
            title: id.to_string(),
            category: category.to_string(),
            author: author.to_string(),
            author_url: format!("https://github.com/{author}"),
            author_avatar_url: format!("https://avatars.example.com/{author}"),
            html_url: format!("https://github.com/{author}/{id}"),
            content_type: "application/x-nar".to_string(),
            created_at_time: "2024-01-01T00:00:00Z".to_string(),
            created_at_str: "2024-01-01 09:00:00".to_string(),
            created_at_rss2: "Mon, 01 Jan 2024 09:00:00 +0900".to_string(),
            updated_at_time: "2024-01-02T00:00:00Z".to_string(),
            updated_at_str: "2024-01-02 09:00:00".to_string(),
            updated_at_rss2: "Tue, 02 Jan 2024 09:00:00 +0900".to_string(),
            browser_download_url: format!("https://example.com/{id}.nar"),
            install_uri: format!(
                "x-ukagaka-link:type=install&url=https%3A%2F%2Fexample.com%2F{id}.nar"
            ),
            filesize: "1.5".to_string(),
            size: 1536,
            download_count: 3,
            readme: "a readme".to_string(),
            description: "desc".to_string(),
            topics: vec!["ukagaka-ghost".to_string()],
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.push(entry("alice_one", "ghost", "alice"));
        catalog.push(entry("bob_two", "shell", "bob"));
        catalog.push(entry("alice_three", "ghost", "alice"));
        catalog
    }

    #[test]
    fn test_render_site_layout() {
        let out = tempdir().unwrap();
        let renderer = Renderer::new(site()).unwrap();
        renderer.render_site(out.path(), &catalog()).unwrap();

        for file in [
            "index.html",
            "rss2.xml",
            "sitemap.xml",
            "ghost/index.html",
            "ghost/rss2.xml",
            "shell/index.html",
            "author/alice/index.html",
            "author/alice/rss2.xml",
            "author/bob/index.html",
        ] {
            assert!(out.path().join(file).exists(), "missing {file}");
        }
    }

    #[test]
    fn test_listing_content_and_escaping() {
        let out = tempdir().unwrap();
        let renderer = Renderer::new(site()).unwrap();
        renderer.render_site(out.path(), &catalog()).unwrap();

        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(index.contains(r#"<article id="alice_one""#));
        assert!(index.contains("alice_three"));
        assert!(index.contains("bob_two"));
        // The install URI's ampersand must be entity-escaped inside href.
        assert!(index.contains("x-ukagaka-link:type=install&amp;url="));
        assert!(index.ends_with('\n'));

        let ghost = fs::read_to_string(out.path().join("ghost/index.html")).unwrap();
        assert!(ghost.contains("alice_one"));
        assert!(!ghost.contains(r#"<article id="bob_two""#));
    }

    #[test]
    fn test_feed_content() {
        let out = tempdir().unwrap();
        let renderer = Renderer::new(site()).unwrap();
        renderer.render_site(out.path(), &catalog()).unwrap();

        let feed = fs::read_to_string(out.path().join("author/bob/rss2.xml")).unwrap();
        assert!(feed.contains("<pubDate>Tue, 02 Jan 2024 09:00:00 +0900</pubDate>"));
        assert!(feed.contains(r#"<guid isPermaLink="false">bob_two</guid>"#));
        assert!(!feed.contains("alice_one"));
        assert!(feed.ends_with('\n'));
    }

    #[test]
    fn test_sitemap_enumerates_pages() {
        let out = tempdir().unwrap();
        let renderer = Renderer::new(site()).unwrap();
        renderer.render_site(out.path(), &catalog()).unwrap();

        let sitemap = fs::read_to_string(out.path().join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://nar.example.com/</loc>"));
        assert!(sitemap.contains("<loc>https://nar.example.com/ghost/</loc>"));
        assert!(sitemap.contains("<loc>https://nar.example.com/author/alice/</loc>"));
        assert!(sitemap.contains("<lastmod>"));
    }

    #[test]
    fn test_category_and_author_dirs_are_replaced() {
        let out = tempdir().unwrap();
        fs::create_dir_all(out.path().join("ghost")).unwrap();
        fs::write(out.path().join("ghost/stale.html"), "old").unwrap();
        fs::create_dir_all(out.path().join("author/gone-author")).unwrap();

        let renderer = Renderer::new(site()).unwrap();
        renderer.render_site(out.path(), &catalog()).unwrap();

        assert!(!out.path().join("ghost/stale.html").exists());
        assert!(!out.path().join("author/gone-author").exists());
        assert!(out.path().join("ghost/index.html").exists());
    }

    #[test]
    fn test_rendering_is_deterministic_except_sitemap_date() {
        let out1 = tempdir().unwrap();
        let out2 = tempdir().unwrap();
        let renderer = Renderer::new(site()).unwrap();
        renderer.render_site(out1.path(), &catalog()).unwrap();
        renderer.render_site(out2.path(), &catalog()).unwrap();

        let a = fs::read_to_string(out1.path().join("index.html")).unwrap();
        let b = fs::read_to_string(out2.path().join("index.html")).unwrap();
        assert_eq!(a, b);

        let a = fs::read_to_string(out1.path().join("rss2.xml")).unwrap();
        let b = fs::read_to_string(out2.path().join("rss2.xml")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_catalog_still_renders_top_level() {
        let out = tempdir().unwrap();
        let renderer = Renderer::new(site()).unwrap();
        renderer.render_site(out.path(), &Catalog::default()).unwrap();

        assert!(out.path().join("index.html").exists());
        assert!(out.path().join("sitemap.xml").exists());
        assert!(out.path().join("author").is_dir());
    }
}
