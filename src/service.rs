// src/service.rs
//! `NewsService`: the library entry point used by page rendering.
//!
//! Holds the configured providers and a small revalidation cache so repeated
//! renders inside the window do not refetch. No other state is shared between
//! requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use metrics::counter;

use crate::categories::{self, ALL_CATEGORY_ID};
use crate::error::NewsError;
use crate::ingest::config::{FetchSettings, NewsConfig};
use crate::ingest::providers::rss::{build_client, FeedProvider};
use crate::ingest::types::{NewsItem, SourceProvider};
use crate::ingest::{self, FetchReport};
use crate::resolver::ResolvedCategory;
use crate::selection::{self, CategoryFilterStrategy, NewsViews};

const GLOBAL_KEY: &str = "*";

struct CacheEntry {
    items: Arc<Vec<NewsItem>>,
    fetched_at: Instant,
}

/// Per-hint cache of fetched lists; `ttl == 0` disables it.
pub struct FeedCache {
    ttl: Duration,
    inner: Mutex<HashMap<String, CacheEntry>>,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<NewsItem>>> {
        if self.ttl.is_zero() {
            return None;
        }
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        match guard.get(key) {
            Some(e) if e.fetched_at.elapsed() < self.ttl => Some(e.items.clone()),
            Some(_) => {
                guard.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: &str, items: Arc<Vec<NewsItem>>) {
        if self.ttl.is_zero() {
            return;
        }
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        guard.insert(
            key.to_string(),
            CacheEntry {
                items,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }
}

pub struct NewsService {
    providers: Vec<Arc<dyn SourceProvider>>,
    fetch: FetchSettings,
    strategy: CategoryFilterStrategy,
    cache: FeedCache,
}

impl NewsService {
    pub fn new(
        providers: Vec<Arc<dyn SourceProvider>>,
        fetch: FetchSettings,
        strategy: CategoryFilterStrategy,
    ) -> Self {
        let cache = FeedCache::new(fetch.revalidate());
        Self {
            providers,
            fetch,
            strategy,
            cache,
        }
    }

    /// HTTP-backed providers for every configured source.
    pub fn from_config(cfg: &NewsConfig) -> Result<Self> {
        let client = build_client(&cfg.fetch)?;
        let providers = cfg
            .sources
            .iter()
            .map(|s| Arc::new(FeedProvider::from_config(s, &cfg.fetch, client.clone())) as Arc<dyn SourceProvider>)
            .collect();
        tracing::info!(
            target: "news",
            sources = cfg.sources.len(),
            timeout_ms = cfg.fetch.timeout_ms,
            revalidate_secs = cfg.fetch.revalidate_secs,
            strategy = ?cfg.selection.filter_strategy,
            "news service configured"
        );
        Ok(Self::new(providers, cfg.fetch.clone(), cfg.selection.filter_strategy))
    }

    pub fn strategy(&self) -> CategoryFilterStrategy {
        self.strategy
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    /// Drop cached lists so the next call refetches.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    /// One uncached pass over all sources.
    pub async fn fetch_report(&self, category_hint: Option<&str>) -> FetchReport {
        ingest::run_once(&self.providers, category_hint, self.fetch.timeout()).await
    }

    /// Fetched list for a hint, served from cache inside the revalidation window.
    pub async fn fetch_items(&self, category_hint: Option<&str>) -> Arc<Vec<NewsItem>> {
        let key = category_hint.unwrap_or(GLOBAL_KEY);
        if let Some(hit) = self.cache.get(key) {
            counter!("news_cache_hits_total").increment(1);
            return hit;
        }
        counter!("news_cache_misses_total").increment(1);

        let report = self.fetch_report(category_hint).await;
        let all_failed = report.all_failed();
        let items = Arc::new(report.items);
        // An all-failed pass is not worth remembering for a whole window.
        if !all_failed {
            self.cache.put(key, items.clone());
        }
        items
    }

    /// `getNews`: items for a category (no fallback), or everything for `all`.
    pub async fn get_news(&self, category_id: Option<&str>) -> Result<Vec<NewsItem>, NewsError> {
        let id = category_id.map(str::trim).unwrap_or_default();
        if id.is_empty() || id == ALL_CATEGORY_ID {
            return Ok(self.fetch_items(None).await.as_ref().clone());
        }
        let entry = categories::find(id).ok_or_else(|| NewsError::CategoryNotFound(id.to_string()))?;
        let items = self.fetch_items(Some(entry.id)).await;
        Ok(selection::filter_by_category(&items, entry, self.strategy))
    }

    /// Featured/trending/feed for an already resolved category. For a specific
    /// category the global list is fetched alongside for trending.
    pub async fn news_views(&self, category: &ResolvedCategory) -> NewsViews {
        match category.entry {
            None => {
                let items = self.fetch_items(None).await;
                selection::build_views(&items, category, &[], self.strategy)
            }
            Some(entry) => {
                let (local, global) =
                    tokio::join!(self.fetch_items(Some(entry.id)), self.fetch_items(None));
                selection::build_views(&local, category, &global, self.strategy)
            }
        }
    }
}
