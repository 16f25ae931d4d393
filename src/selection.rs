// src/selection.rs
//! Selection engine: turns a fetched item list into the three page views.
//!
//! 1. Category filter (with the "never empty" fallback to the first
//!    `FALLBACK_SIZE` unfiltered items).
//! 2. Featured: diversity pass (one item per `author`), then fill pass.
//! 3. Remaining = working set − featured (by `link`).
//! 4. Trending: first `TRENDING_SIZE` of remaining for `all`; for a specific
//!    category, first `TRENDING_SIZE` of the *global* remaining set.
//! 5. Feed: `all` skips the trending window; a category starts at 0.
//!
//! Everything here is a pure function of input order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::categories::Category;
use crate::ingest::types::NewsItem;
use crate::resolver::ResolvedCategory;

pub const FEATURED_SIZE: usize = 5;
pub const TRENDING_SIZE: usize = 10;
pub const FEED_SIZE: usize = 30;
pub const FALLBACK_SIZE: usize = 10;

/// How items are matched against a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryFilterStrategy {
    /// Match the normalized `categoryId` (or the category label).
    #[default]
    ById,
    /// Legacy: any category keyword inside `title + excerpt`.
    ByKeyword,
}

impl CategoryFilterStrategy {
    pub fn matches(self, item: &NewsItem, category: &Category) -> bool {
        match self {
            CategoryFilterStrategy::ById => {
                item.category_id.as_deref() == Some(category.id)
                    || item.category.eq_ignore_ascii_case(category.id)
                    || item.category.eq_ignore_ascii_case(category.name)
            }
            CategoryFilterStrategy::ByKeyword => {
                category.keyword_hit(&format!("{} {}", item.title, item.excerpt))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewsViews {
    pub featured: Vec<NewsItem>,
    pub trending: Vec<NewsItem>,
    pub feed: Vec<NewsItem>,
}

impl NewsViews {
    pub fn is_empty(&self) -> bool {
        self.featured.is_empty() && self.trending.is_empty() && self.feed.is_empty()
    }
}

/// Items matching `category`; no fallback.
pub fn filter_by_category(
    items: &[NewsItem],
    category: &Category,
    strategy: CategoryFilterStrategy,
) -> Vec<NewsItem> {
    items
        .iter()
        .filter(|it| strategy.matches(it, category))
        .cloned()
        .collect()
}

/// Step 1: the working set for a resolved category.
pub fn working_set(
    items: &[NewsItem],
    category: &ResolvedCategory,
    strategy: CategoryFilterStrategy,
) -> Vec<NewsItem> {
    let Some(entry) = category.entry else {
        return items.to_vec();
    };
    let filtered = filter_by_category(items, entry, strategy);
    if filtered.is_empty() && !items.is_empty() {
        tracing::debug!(
            target: "news",
            category = entry.id,
            total = items.len(),
            "no items matched category, using first unfiltered items"
        );
        return items.iter().take(FALLBACK_SIZE).cloned().collect();
    }
    filtered
}

/// Step 2: up to `size` featured items, one per author first, then filled in order.
pub fn select_featured(items: &[NewsItem], size: usize) -> Vec<NewsItem> {
    let mut featured: Vec<NewsItem> = Vec::with_capacity(size.min(items.len()));
    let mut seen_authors: HashSet<&str> = HashSet::new();
    let mut chosen_links: HashSet<&str> = HashSet::new();

    // Diversity pass.
    for it in items {
        if featured.len() >= size {
            break;
        }
        if seen_authors.contains(it.author.as_str()) || chosen_links.contains(it.link.as_str()) {
            continue;
        }
        seen_authors.insert(it.author.as_str());
        chosen_links.insert(it.link.as_str());
        featured.push(it.clone());
    }

    // Fill pass.
    for it in items {
        if featured.len() >= size {
            break;
        }
        if chosen_links.insert(it.link.as_str()) {
            featured.push(it.clone());
        }
    }

    featured
}

/// Step 3: items whose `link` is not featured, in original order.
pub fn remaining_after(items: &[NewsItem], featured: &[NewsItem]) -> Vec<NewsItem> {
    let taken: HashSet<&str> = featured.iter().map(|f| f.link.as_str()).collect();
    items
        .iter()
        .filter(|it| !taken.contains(it.link.as_str()))
        .cloned()
        .collect()
}

/// Trending list from a global (unfiltered) item list.
pub fn global_trending(global: &[NewsItem]) -> Vec<NewsItem> {
    let featured = select_featured(global, FEATURED_SIZE);
    remaining_after(global, &featured)
        .into_iter()
        .take(TRENDING_SIZE)
        .collect()
}

/// Steps 1–5. `global` is the unfiltered list used for trending when a
/// specific category is selected; it is ignored for `all`.
pub fn build_views(
    items: &[NewsItem],
    category: &ResolvedCategory,
    global: &[NewsItem],
    strategy: CategoryFilterStrategy,
) -> NewsViews {
    let working = working_set(items, category, strategy);
    let featured = select_featured(&working, FEATURED_SIZE);
    let remaining = remaining_after(&working, &featured);

    let (trending, feed) = if category.is_all() {
        let trending = remaining.iter().take(TRENDING_SIZE).cloned().collect();
        let feed = remaining
            .iter()
            .skip(TRENDING_SIZE)
            .take(FEED_SIZE)
            .cloned()
            .collect();
        (trending, feed)
    } else {
        let feed = remaining.into_iter().take(FEED_SIZE).collect();
        (global_trending(global), feed)
    };

    NewsViews {
        featured,
        trending,
        feed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories;

    fn item(link: &str, author: &str) -> NewsItem {
        NewsItem {
            title: format!("title {link}"),
            link: link.to_string(),
            excerpt: String::new(),
            time: String::new(),
            iso_date: None,
            category: String::new(),
            category_id: None,
            image: String::new(),
            author: author.to_string(),
            source_logo: None,
            published_at: None,
        }
    }

    #[test]
    fn diversity_pass_takes_first_item_per_author() {
        let items = vec![
            item("a1", "A"),
            item("a2", "A"),
            item("b1", "B"),
            item("c1", "C"),
            item("d1", "D"),
            item("e1", "E"),
            item("f1", "F"),
        ];
        let f = select_featured(&items, 5);
        let links: Vec<_> = f.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["a1", "b1", "c1", "d1", "e1"]);
    }

    #[test]
    fn single_author_fills_from_same_source() {
        let items: Vec<_> = (0..8).map(|i| item(&format!("x{i}"), "Solo")).collect();
        let f = select_featured(&items, 5);
        let links: Vec<_> = f.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["x0", "x1", "x2", "x3", "x4"]);
    }

    #[test]
    fn duplicate_links_are_never_featured_twice() {
        let items = vec![item("same", "A"), item("same", "B"), item("other", "C")];
        let f = select_featured(&items, 5);
        let links: Vec<_> = f.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["same", "other"]);
    }

    #[test]
    fn keyword_strategy_reads_title_and_excerpt() {
        let gaming = categories::find("gaming").unwrap();
        let mut it = item("g", "A");
        it.excerpt = "The new Xbox is out".into();
        assert!(CategoryFilterStrategy::ByKeyword.matches(&it, gaming));
        assert!(!CategoryFilterStrategy::ById.matches(&it, gaming));
        it.category = "Gaming".into();
        assert!(CategoryFilterStrategy::ById.matches(&it, gaming));
    }

    #[test]
    fn strategy_deserializes_from_kebab_case() {
        #[derive(Deserialize)]
        struct W {
            s: CategoryFilterStrategy,
        }
        let w: W = toml::from_str(r#"s = "by-keyword""#).unwrap();
        assert_eq!(w.s, CategoryFilterStrategy::ByKeyword);
    }
}
