//! Aggregation of classified entries for rendering.

use crate::entry::Entry;

/// Everything one run discovered, in discovery order.
///
/// Categories and authors are deduplicated but keep first-occurrence order,
/// which later drives per-category and per-author page generation without an
/// explicit sort.
#[derive(Debug, Default)]
pub struct Catalog {
    pub entries: Vec<Entry>,
    pub categories: Vec<String>,
    pub authors: Vec<String>,
}

impl Catalog {
    pub fn push(&mut self, entry: Entry) {
        if !self.categories.contains(&entry.category) {
            self.categories.push(entry.category.clone());
        }
        if !self.authors.contains(&entry.author) {
            self.authors.push(entry.author.clone());
        }
        self.entries.push(entry);
    }

    pub fn by_category<'a>(&'a self, category: &str) -> Vec<&'a Entry> {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    pub fn by_author<'a>(&'a self, author: &str) -> Vec<&'a Entry> {
        self.entries.iter().filter(|e| e.author == author).collect()
    }
}
