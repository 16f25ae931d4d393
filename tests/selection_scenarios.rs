use std::collections::HashSet;

use hub_news::i18n::Catalog;
use hub_news::ingest::types::NewsItem;
use hub_news::page::assemble;
use hub_news::resolver::{resolve_category, ResolvedCategory};
use hub_news::selection::{
    build_views, select_featured, CategoryFilterStrategy, FALLBACK_SIZE, FEATURED_SIZE, FEED_SIZE,
    TRENDING_SIZE,
};

fn item(n: usize, author: &str, category_id: Option<&str>) -> NewsItem {
    NewsItem {
        title: format!("Story {n}"),
        link: format!("https://news.test/{n}"),
        excerpt: String::new(),
        time: String::new(),
        iso_date: None,
        category: category_id.unwrap_or("News").to_string(),
        category_id: category_id.map(str::to_string),
        image: String::new(),
        author: author.to_string(),
        source_logo: None,
        published_at: None,
    }
}

fn resolved(id: &str) -> ResolvedCategory {
    resolve_category(Some(id), &Catalog::embedded(), "en").unwrap()
}

fn links(items: &[NewsItem]) -> Vec<&str> {
    items.iter().map(|i| i.link.as_str()).collect()
}

/// Mixed sources and categories, in merged order.
fn corpus(n: usize) -> Vec<NewsItem> {
    let authors = ["bbc", "guardian", "verge", "espn"];
    let cats = ["world", "business", "sports", "tech-science", "health"];
    (0..n)
        .map(|i| item(i, authors[i % authors.len()], Some(cats[i % cats.len()])))
        .collect()
}

#[test]
fn scenario_a_seven_items_three_authors() {
    let items = vec![
        item(0, "a", None),
        item(1, "a", None),
        item(2, "b", None),
        item(3, "a", None),
        item(4, "c", None),
        item(5, "b", None),
        item(6, "c", None),
    ];
    let v = build_views(&items, &resolved("all"), &[], CategoryFilterStrategy::ById);

    assert_eq!(
        links(&v.featured),
        vec![
            "https://news.test/0",
            "https://news.test/2",
            "https://news.test/4",
            "https://news.test/1",
            "https://news.test/3",
        ]
    );
    assert_eq!(links(&v.trending), vec!["https://news.test/5", "https://news.test/6"]);
    assert!(v.feed.is_empty());
}

#[test]
fn scenario_b_no_items_renders_empty_state() {
    let m = Catalog::embedded();
    let all = resolved("all");
    let v = build_views(&[], &all, &[], CategoryFilterStrategy::ById);
    assert!(v.is_empty());

    let page = assemble(&all, v, &m, "en");
    assert!(page.empty);
    assert_eq!(page.empty_message.as_deref(), Some("No news right now. Check back soon."));
}

#[test]
fn scenario_c_unmatched_category_falls_back_to_first_unfiltered() {
    let items = corpus(50);
    assert!(items.iter().all(|i| i.category_id.as_deref() != Some("gaming")));

    let v = build_views(&items, &resolved("gaming"), &items, CategoryFilterStrategy::ById);
    let shown: HashSet<&str> = v.featured.iter().chain(&v.feed).map(|i| i.link.as_str()).collect();
    let first: HashSet<&str> = items[..FALLBACK_SIZE].iter().map(|i| i.link.as_str()).collect();
    assert_eq!(shown, first);
    assert_eq!(v.featured.len(), FEATURED_SIZE);
    assert_eq!(v.feed.len(), FALLBACK_SIZE - FEATURED_SIZE);
}

#[test]
fn all_view_windows_do_not_overlap_and_respect_sizes() {
    let items = corpus(80);
    let v = build_views(&items, &resolved("all"), &[], CategoryFilterStrategy::ById);
    assert_eq!(v.featured.len(), FEATURED_SIZE);
    assert_eq!(v.trending.len(), TRENDING_SIZE);
    assert_eq!(v.feed.len(), FEED_SIZE);

    let mut seen = HashSet::new();
    for it in v.featured.iter().chain(&v.trending).chain(&v.feed) {
        assert!(seen.insert(it.link.as_str()), "duplicate {}", it.link);
    }
}

#[test]
fn category_view_draws_trending_from_global_list() {
    let global = corpus(40);
    let local: Vec<NewsItem> = global
        .iter()
        .filter(|i| i.category_id.as_deref() == Some("sports"))
        .cloned()
        .collect();

    let v = build_views(&local, &resolved("sports"), &global, CategoryFilterStrategy::ById);
    assert!(v.featured.iter().all(|i| i.category_id.as_deref() == Some("sports")));
    assert!(v.feed.iter().all(|i| i.category_id.as_deref() == Some("sports")));
    assert_eq!(v.feed.len(), local.len() - FEATURED_SIZE);

    let global_featured = select_featured(&global, FEATURED_SIZE);
    let expected: Vec<&str> = global
        .iter()
        .filter(|g| !global_featured.iter().any(|f| f.link == g.link))
        .take(TRENDING_SIZE)
        .map(|i| i.link.as_str())
        .collect();
    assert_eq!(links(&v.trending), expected);
}

#[test]
fn dominating_author_cannot_crowd_out_others() {
    let mut items: Vec<NewsItem> = (0..20).map(|i| item(i, "wire", None)).collect();
    items.push(item(20, "blog", None));
    items.push(item(21, "zine", None));

    let featured = select_featured(&items, FEATURED_SIZE);
    let authors: Vec<&str> = featured.iter().map(|i| i.author.as_str()).collect();
    assert_eq!(authors, vec!["wire", "blog", "zine", "wire", "wire"]);
}

#[test]
fn keyword_strategy_matches_title_text() {
    let mut items = corpus(12);
    items[7].title = "Nintendo reveals new handheld".into();
    let v = build_views(&items, &resolved("gaming"), &items, CategoryFilterStrategy::ByKeyword);
    assert_eq!(links(&v.featured), vec!["https://news.test/7"]);
    assert!(v.feed.is_empty());
}

#[test]
fn selection_is_deterministic() {
    let items = corpus(60);
    let a = build_views(&items, &resolved("all"), &[], CategoryFilterStrategy::ById);
    let b = build_views(&items, &resolved("all"), &[], CategoryFilterStrategy::ById);
    assert_eq!(a, b);
}

#[test]
fn five_distinct_authors_fill_from_diversity_pass_alone() {
    let items = corpus(3)
        .into_iter()
        .chain((3..12).map(|n| item(n, &format!("indie{n}"), None)))
        .collect::<Vec<_>>();
    let featured = select_featured(&items, FEATURED_SIZE);
    let authors: HashSet<&str> = featured.iter().map(|i| i.author.as_str()).collect();
    assert_eq!(featured.len(), FEATURED_SIZE);
    assert_eq!(authors.len(), FEATURED_SIZE);
}

#[test]
fn fewer_items_than_featured_size_are_all_featured() {
    let items = vec![item(0, "a", None), item(1, "a", None), item(2, "b", None)];
    let v = build_views(&items, &resolved("all"), &[], CategoryFilterStrategy::ById);
    assert_eq!(v.featured.len(), 3);
    assert!(v.trending.is_empty() && v.feed.is_empty());
}
