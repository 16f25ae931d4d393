// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/news (all, category, unknown category, locale)
// - GET /api/news/items
// - GET /api/news/categories

use std::sync::Arc;

use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use hub_news::i18n::Catalog;
use hub_news::ingest::config::{FetchSettings, SourceConfig};
use hub_news::ingest::providers::rss::FeedProvider;
use hub_news::ingest::types::SourceProvider;
use hub_news::selection::CategoryFilterStrategy;
use hub_news::{router, AppState, NewsService};

const BODY_LIMIT: usize = 1024 * 1024;

fn fixture(id: &str, name: &str, category: &str, xml: &str) -> Arc<dyn SourceProvider> {
    let cfg = SourceConfig {
        id: id.into(),
        name: name.into(),
        url: format!("https://{id}.test/rss"),
        logo: None,
        category: Some(category.into()),
        category_urls: Default::default(),
    };
    Arc::new(FeedProvider::from_fixture(&cfg, xml))
}

/// Router over fixture-backed sources.
fn test_router() -> Router {
    let providers = vec![
        fixture("wire", "Wire", "world", include_str!("fixtures/rss_mixed.xml")),
        fixture("pixel", "Pixel", "gaming", include_str!("fixtures/atom_feed.xml")),
    ];
    let service = NewsService::new(providers, FetchSettings::default(), CategoryFilterStrategy::ById);
    router(AppState::new(service, Catalog::embedded()))
}

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = test_router().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

async fn get_json(uri: &str) -> (StatusCode, Json) {
    let (status, bytes) = get(uri).await;
    let v: Json = serde_json::from_slice(&bytes).expect("json body");
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let (status, bytes) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "OK");
}

#[tokio::test]
async fn api_news_all_returns_page_sections() {
    let (status, v) = get_json("/api/news").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(v["category"]["id"], "all");
    assert_eq!(v["locale"], "en");
    assert_eq!(v["empty"], false);
    assert!(v.get("emptyMessage").is_none() && v.get("empty_message").is_none());

    let featured = v["featured"].as_array().expect("featured array");
    assert_eq!(featured.len(), 5);
    assert_eq!(featured[0]["link"], "https://wire.test/cup-final");
    assert!(featured[0].get("isoDate").is_some(), "items are camelCase");
    assert!(featured[0].get("publishedAt").is_none());

    let sidebar = v["sidebar"].as_array().expect("sidebar array");
    assert_eq!(sidebar[0]["id"], "all");
    assert_eq!(sidebar[0]["active"], true);
}

#[tokio::test]
async fn api_news_category_is_localized() {
    let (status, v) = get_json("/api/news?category=gaming&locale=fr").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["category"]["id"], "gaming");
    assert_eq!(v["category"]["label"], "Jeux vidéo");
    assert_eq!(v["locale"], "fr");
    assert_eq!(v["featured"][0]["link"], "https://pixel.test/console-sales");
}

#[tokio::test]
async fn api_news_unknown_category_is_404() {
    let (status, v) = get_json("/api/news?category=unknown-slug").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "category_not_found");
    assert_eq!(v["category"], "unknown-slug");
}

#[tokio::test]
async fn api_news_items_filters_without_fallback() {
    let (status, v) = get_json("/api/news/items?category=sports").await;
    assert_eq!(status, StatusCode::OK);
    let items = v.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["categoryId"], "sports");

    let (_, all) = get_json("/api/news/items").await;
    assert_eq!(all.as_array().map(Vec::len), Some(5));

    let (status, _) = get("/api/news/items?category=nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_categories_lists_taxonomy() {
    let (status, v) = get_json("/api/news/categories").await;
    assert_eq!(status, StatusCode::OK);
    let cats = v.as_array().expect("array");
    assert_eq!(cats.len(), hub_news::CATEGORIES.len() + 1);
    assert_eq!(cats[0]["id"], "all");
    assert_eq!(cats[0]["icon_name"], "LayoutGrid");
    assert!(cats.iter().any(|c| c["id"] == "tech-science"));
}
