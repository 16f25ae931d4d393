// src/ingest/config.rs
//! News service configuration (`config/news.toml`).
//!
//! Lookup order: `$NEWS_CONFIG_PATH` → `config/news.toml` → built-in seed.
//! `NEWS_FETCH_TIMEOUT_MS` and `NEWS_REVALIDATE_SECS` override the file.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::categories;
use crate::selection::CategoryFilterStrategy;

pub const ENV_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const ENV_FETCH_TIMEOUT_MS: &str = "NEWS_FETCH_TIMEOUT_MS";
pub const ENV_REVALIDATE_SECS: &str = "NEWS_REVALIDATE_SECS";
pub const DEFAULT_CONFIG_PATH: &str = "config/news.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// Per-source time budget.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Revalidation window for fetched lists; 0 disables caching.
    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: u64,
    #[serde(default = "default_max_items")]
    pub max_items_per_source: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    8_000
}
fn default_revalidate_secs() -> u64 {
    3_600
}
fn default_max_items() -> usize {
    40
}
fn default_user_agent() -> String {
    concat!("hub-news/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            revalidate_secs: default_revalidate_secs(),
            max_items_per_source: default_max_items(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionSettings {
    #[serde(default)]
    pub filter_strategy: CategoryFilterStrategy,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub logo: Option<String>,
    /// Taxonomy id applied to items the feed leaves untagged.
    #[serde(default)]
    pub category: Option<String>,
    /// Category id → category-specific feed URL.
    #[serde(default)]
    pub category_urls: BTreeMap<String, String>,
}

impl NewsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: NewsConfig = toml::from_str(s).context("parsing news config toml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading news config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("loading news config from {}", path.display()))
    }

    /// Env path → `config/news.toml` → seed, then env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Self::load_from(&default)?
            } else {
                tracing::info!(target: "news", "no news config found, using built-in sources");
                Self::default_seed()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = parse_env_u64(std::env::var(ENV_FETCH_TIMEOUT_MS).ok()) {
            self.fetch.timeout_ms = v.max(1);
        }
        if let Some(v) = parse_env_u64(std::env::var(ENV_REVALIDATE_SECS).ok()) {
            self.fetch.revalidate_secs = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for s in &self.sources {
            let id = s.id.trim();
            if id.is_empty() {
                bail!("source with url `{}` has an empty id", s.url);
            }
            if !ids.insert(id) {
                bail!("duplicate source id `{id}`");
            }
            reqwest::Url::parse(&s.url).with_context(|| format!("source `{id}`: bad url"))?;
            if let Some(c) = &s.category {
                if categories::find(c).is_none() {
                    bail!(
                        "source `{id}`: unknown default category `{c}` (known: {})",
                        known_categories()
                    );
                }
            }
            for (c, u) in &s.category_urls {
                if categories::find(c).is_none() {
                    bail!(
                        "source `{id}`: unknown category `{c}` in category_urls (known: {})",
                        known_categories()
                    );
                }
                reqwest::Url::parse(u)
                    .with_context(|| format!("source `{id}`: bad url for category `{c}`"))?;
            }
        }
        if self.fetch.max_items_per_source == 0 {
            bail!("fetch.max_items_per_source must be > 0");
        }
        Ok(())
    }

    /// Built-in sources used when no config file exists.
    pub fn default_seed() -> Self {
        let src = |id: &str, name: &str, url: &str, category: Option<&str>| SourceConfig {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            logo: None,
            category: category.map(str::to_string),
            category_urls: BTreeMap::new(),
        };
        let mut bbc = src("bbc", "BBC News", "https://feeds.bbci.co.uk/news/rss.xml", Some("world"));
        for (c, u) in [
            ("world", "https://feeds.bbci.co.uk/news/world/rss.xml"),
            ("business", "https://feeds.bbci.co.uk/news/business/rss.xml"),
            ("tech-science", "https://feeds.bbci.co.uk/news/technology/rss.xml"),
            ("entertainment", "https://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml"),
            ("health", "https://feeds.bbci.co.uk/news/health/rss.xml"),
            ("politics", "https://feeds.bbci.co.uk/news/politics/rss.xml"),
        ] {
            bbc.category_urls.insert(c.to_string(), u.to_string());
        }
        Self {
            fetch: FetchSettings::default(),
            selection: SelectionSettings::default(),
            sources: vec![
                bbc,
                src("guardian", "The Guardian", "https://www.theguardian.com/international/rss", Some("world")),
                src("verge", "The Verge", "https://www.theverge.com/rss/index.xml", Some("tech-science")),
                src("espn", "ESPN", "https://www.espn.com/espn/rss/news", Some("sports")),
                src("polygon", "Polygon", "https://www.polygon.com/rss/index.xml", Some("gaming")),
            ],
        }
    }
}

fn known_categories() -> String {
    categories::ids().collect::<Vec<_>>().join(", ")
}

fn parse_env_u64(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
}
