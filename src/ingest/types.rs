// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Normalized news item; immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub link: String, // dedup key within one fetch batch
    pub excerpt: String,
    pub time: String, // display-formatted, e.g. "3 h ago"
    pub iso_date: Option<String>,
    pub category: String,
    pub category_id: Option<String>,
    pub image: String, // may be empty
    pub author: String, // source name; diversity key, never empty
    pub source_logo: Option<String>,
    #[serde(skip)]
    pub published_at: Option<i64>, // unix seconds, for recency ordering
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// Fetch and normalize this source's items. `category_hint` may select a
    /// category-specific endpoint; providers without one ignore it.
    async fn fetch_latest(&self, category_hint: Option<&str>) -> Result<Vec<NewsItem>>;
    fn id(&self) -> &str;
}
