// src/page.rs
//! Page assembly: resolved category + views + sidebar → render payload.

use serde::Serialize;

use crate::error::NewsError;
use crate::i18n::{Catalog, MessageLookup};
use crate::ingest::types::NewsItem;
use crate::resolver::{all_resolved, resolve_category, ResolvedCategory};
use crate::selection::NewsViews;
use crate::service::NewsService;

#[derive(Debug, Clone, Serialize)]
pub struct SidebarEntry {
    pub id: String,
    pub label: String,
    pub icon: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryHeader {
    pub id: String,
    pub label: String,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsPage {
    pub locale: String,
    pub category: CategoryHeader,
    pub sidebar: Vec<SidebarEntry>,
    pub featured: Vec<NewsItem>,
    pub trending: Vec<NewsItem>,
    pub feed: Vec<NewsItem>,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

pub fn sidebar(messages: &dyn MessageLookup, locale: &str, active_id: &str) -> Vec<SidebarEntry> {
    all_resolved(messages, locale)
        .into_iter()
        .map(|c| SidebarEntry {
            active: c.id == active_id,
            id: c.id,
            label: c.label,
            icon: c.icon,
        })
        .collect()
}

pub fn assemble(
    category: &ResolvedCategory,
    views: NewsViews,
    messages: &dyn MessageLookup,
    locale: &str,
) -> NewsPage {
    let empty = views.is_empty();
    let empty_message = if empty {
        Some(
            messages
                .text(locale, "news.empty")
                .unwrap_or_else(|| "No news".to_string()),
        )
    } else {
        None
    };
    NewsPage {
        locale: locale.to_string(),
        category: CategoryHeader {
            id: category.id.clone(),
            label: category.label.clone(),
            icon: category.icon,
        },
        sidebar: sidebar(messages, locale, &category.id),
        featured: views.featured,
        trending: views.trending,
        feed: views.feed,
        empty,
        empty_message,
    }
}

/// Resolve (rejecting unknown ids before any fetch), select, assemble.
pub async fn news_page(
    service: &NewsService,
    messages: &Catalog,
    category_id: Option<&str>,
    locale: Option<&str>,
) -> Result<NewsPage, NewsError> {
    let locale = messages.negotiate(locale);
    let category = resolve_category(category_id, messages, &locale)?;
    let views = service.news_views(&category).await;
    if views.is_empty() {
        tracing::info!(target: "news", category = %category.id, "rendering empty state");
    }
    Ok(assemble(&category, views, messages, &locale))
}
