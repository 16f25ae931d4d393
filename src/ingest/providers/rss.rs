// src/ingest/providers/rss.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use std::collections::BTreeMap;

use crate::categories::{self, Category};
use crate::ingest::config::{FetchSettings, SourceConfig};
use crate::ingest::providers::feed_xml::parse_feed;
use crate::ingest::types::{NewsItem, SourceProvider};
use crate::ingest::{normalize_feed, SourceMeta};

/// One configured news source (RSS 2.0, RDF or Atom).
pub struct FeedProvider {
    meta: SourceMeta,
    limit: usize,
    mode: Mode,
}

enum Mode {
    // Owned copy of the document; tests and the probe binary feed XML directly.
    Fixture(String),
    Http {
        url: String,
        category_urls: BTreeMap<String, String>,
        client: reqwest::Client,
    },
}

impl FeedProvider {
    pub fn from_config(cfg: &SourceConfig, fetch: &FetchSettings, client: reqwest::Client) -> Self {
        Self {
            meta: meta_from(cfg),
            limit: fetch.max_items_per_source,
            mode: Mode::Http {
                url: cfg.url.clone(),
                category_urls: cfg.category_urls.clone(),
                client,
            },
        }
    }

    pub fn from_fixture(cfg: &SourceConfig, xml: &str) -> Self {
        Self {
            meta: meta_from(cfg),
            limit: FetchSettings::default().max_items_per_source,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Endpoint for the given hint: category-specific when configured.
    pub fn endpoint_for(&self, category_hint: Option<&str>) -> Option<&str> {
        match &self.mode {
            Mode::Fixture(_) => None,
            Mode::Http {
                url, category_urls, ..
            } => Some(
                category_hint
                    .and_then(|c| category_urls.get(c))
                    .unwrap_or(url)
                    .as_str(),
            ),
        }
    }

    /// Taxonomy category implied by a category-specific endpoint. Items from
    /// such an endpoint default to it instead of the source's category.
    pub fn endpoint_category(&self, category_hint: Option<&str>) -> Option<&'static Category> {
        match &self.mode {
            Mode::Fixture(_) => None,
            Mode::Http { category_urls, .. } => category_hint
                .filter(|c| category_urls.contains_key(*c))
                .and_then(categories::find),
        }
    }

    fn parse_items(&self, body: &str, category_hint: Option<&str>) -> Result<Vec<NewsItem>> {
        let t0 = std::time::Instant::now();
        let feed = parse_feed(body).with_context(|| format!("parsing feed of `{}`", self.meta.id))?;
        let now = chrono::Utc::now().timestamp();
        let items = match self.endpoint_category(category_hint) {
            Some(c) => {
                let meta = SourceMeta {
                    default_category: Some(c),
                    ..self.meta.clone()
                };
                normalize_feed(feed, &meta, self.limit, now)
            }
            None => normalize_feed(feed, &self.meta, self.limit, now),
        };
        histogram!("news_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(items)
    }
}

fn meta_from(cfg: &SourceConfig) -> SourceMeta {
    SourceMeta {
        id: cfg.id.clone(),
        name: cfg.name.clone(),
        logo: cfg.logo.clone(),
        default_category: cfg.category.as_deref().and_then(categories::find),
    }
}

/// Shared HTTP client for all feed providers.
pub fn build_client(fetch: &FetchSettings) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(fetch.user_agent.clone())
        .timeout(fetch.timeout())
        .build()
        .context("building feed http client")
}

#[async_trait]
impl SourceProvider for FeedProvider {
    async fn fetch_latest(&self, category_hint: Option<&str>) -> Result<Vec<NewsItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items(s, category_hint),
            Mode::Http { client, .. } => {
                let url = self.endpoint_for(category_hint).unwrap_or_default();
                let resp = client
                    .get(url)
                    .header(
                        reqwest::header::ACCEPT,
                        "application/rss+xml, application/atom+xml, application/xml;q=0.9, */*;q=0.8",
                    )
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?;
                let status = resp.status();
                if !status.is_success() {
                    bail!("GET {url} returned {status}");
                }
                let body = resp.text().await.with_context(|| format!("reading body of {url}"))?;
                self.parse_items(&body, category_hint)
            }
        }
    }

    fn id(&self) -> &str {
        &self.meta.id
    }
}
