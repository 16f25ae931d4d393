use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::error::NewsError;
use crate::i18n::Catalog;
use crate::ingest::types::NewsItem;
use crate::page::{self, NewsPage};
use crate::resolver::all_resolved;
use crate::service::NewsService;

#[derive(Clone)]
pub struct AppState {
    pub news: Arc<NewsService>,
    pub messages: Arc<Catalog>,
}

impl AppState {
    pub fn new(news: NewsService, messages: Catalog) -> Self {
        Self {
            news: Arc::new(news),
            messages: Arc::new(messages),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(news_page))
        .route("/api/news/items", get(news_items))
        .route("/api/news/categories", get(news_categories))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, serde::Deserialize)]
struct NewsQuery {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    locale: Option<String>,
}

async fn news_page(
    State(state): State<AppState>,
    Query(q): Query<NewsQuery>,
) -> Result<Json<NewsPage>, NewsError> {
    let page = page::news_page(
        &state.news,
        &state.messages,
        q.category.as_deref(),
        q.locale.as_deref(),
    )
    .await?;
    Ok(Json(page))
}

async fn news_items(
    State(state): State<AppState>,
    Query(q): Query<NewsQuery>,
) -> Result<Json<Vec<NewsItem>>, NewsError> {
    let items = state.news.get_news(q.category.as_deref()).await?;
    Ok(Json(items))
}

#[derive(serde::Serialize)]
struct CategoryOut {
    id: String,
    label: String,
    icon: &'static str,
    icon_name: &'static str,
}

async fn news_categories(
    State(state): State<AppState>,
    Query(q): Query<NewsQuery>,
) -> Json<Vec<CategoryOut>> {
    let locale = state.messages.negotiate(q.locale.as_deref());
    let out = all_resolved(state.messages.as_ref(), &locale)
        .into_iter()
        .map(|c| CategoryOut {
            id: c.id,
            label: c.label,
            icon: c.icon,
            icon_name: c.icon_name,
        })
        .collect();
    Json(out)
}
