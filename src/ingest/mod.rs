// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::categories::{self, Category};
use crate::error::NewsError;
use crate::ingest::providers::feed_xml::{ParsedFeed, RawEntry};
use crate::ingest::types::{NewsItem, SourceProvider};
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime,
};

/// Maximum excerpt length in characters (ellipsis included).
pub const EXCERPT_MAX_CHARS: usize = 240;
/// Hard cap for any normalized text field.
pub const TEXT_MAX_CHARS: usize = 1500;
/// Display category for items nothing could be said about.
pub const FALLBACK_CATEGORY_LABEL: &str = "News";

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_fetch_runs_total", "Fetch passes over all sources.");
        describe_counter!(
            "news_items_fetched_total",
            "Items kept after normalization and dedup."
        );
        describe_counter!(
            "news_source_errors_total",
            "Source fetch/parse failures and timeouts."
        );
        describe_counter!(
            "news_all_sources_failed_total",
            "Fetch passes where every source failed."
        );
        describe_histogram!("news_fetch_ms", "Wall time of a fetch pass in milliseconds.");
        describe_histogram!("news_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, fold quotes and whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode (twice: feeds love `&amp;nbsp;`)
    let once = html_escape::decode_html_entities(s).to_string();
    let mut out = html_escape::decode_html_entities(&once).to_string();

    // 2) Strip HTML tags and comments; a bare `<` or `>` (decoded `&lt;`) stays
    static RE_TAGS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)<!--.*?-->|</?[a-z][^>]*>").unwrap());
    out = RE_TAGS.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. NBSP)
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\u{00A0}]+").unwrap());
    out = RE_WS.replace_all(&out, " ").trim().to_string();

    // 5) Tags replaced by spaces leave "word ." behind
    static RE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r" ([.,;:!?])").unwrap());
    out = RE_PUNCT.replace_all(&out, "$1").to_string();

    if out.chars().count() > TEXT_MAX_CHARS {
        out = out.chars().take(TEXT_MAX_CHARS).collect();
    }
    out
}

/// Cut to `max` chars on a word boundary where possible, appending `…`.
pub fn truncate_excerpt(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep: String = s.chars().take(max.saturating_sub(1)).collect();
    let cut = match keep.rfind(' ') {
        Some(i) if i > keep.len() / 2 => &keep[..i],
        _ => keep.as_str(),
    };
    format!("{}…", cut.trim_end_matches([' ', ',', ';', ':', '.']))
}

/// First `<img src>` in an HTML fragment.
pub fn first_img_src(html: &str) -> Option<String> {
    static RE_IMG: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());
    let decoded = html_escape::decode_html_entities(html);
    RE_IMG
        .captures(&decoded)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// RFC 2822 (RSS) or RFC 3339 (Atom, dc:date) → unix seconds.
pub fn parse_feed_date(ts: &str) -> Option<i64> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(ts, &Rfc2822) {
        return Some(dt.unix_timestamp());
    }
    if let Ok(dt) = OffsetDateTime::parse(ts, &Rfc3339) {
        return Some(dt.unix_timestamp());
    }
    // chrono is lenient with obsolete zones ("GMT", "EST") some feeds still use
    chrono::DateTime::parse_from_rfc2822(ts)
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.timestamp())
}

/// Unix seconds → `2024-05-01T10:00:00Z`.
pub fn iso_date(ts: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

/// Relative display time used on cards.
pub fn format_display_time(published: Option<i64>, now: i64) -> String {
    let Some(ts) = published else {
        return String::new();
    };
    let age = now - ts;
    match age {
        i64::MIN..=59 => "just now".to_string(),
        60..=3_599 => format!("{} min ago", age / 60),
        3_600..=86_399 => format!("{} h ago", age / 3_600),
        86_400..=604_799 => format!("{} d ago", age / 86_400),
        _ => chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.format("%d %b %Y").to_string())
            .unwrap_or_default(),
    }
}

/// Per-source metadata applied during normalization.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
    pub default_category: Option<&'static Category>,
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Raw entry → `NewsItem`, or `None` when it has no title or no usable link.
pub fn normalize_entry(
    raw: RawEntry,
    meta: &SourceMeta,
    feed_title: Option<&str>,
    feed_logo: Option<&str>,
    now: i64,
) -> Option<NewsItem> {
    let title = normalize_text(&raw.title);
    if title.is_empty() {
        return None;
    }

    let link = raw
        .link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .or_else(|| raw.guid.as_deref().map(str::trim).filter(|g| is_url(g)))?
        .to_string();

    let body = if raw.description.trim().is_empty() {
        &raw.content
    } else {
        &raw.description
    };
    let excerpt = truncate_excerpt(&normalize_text(body), EXCERPT_MAX_CHARS);

    let published_at = raw.date().and_then(parse_feed_date);

    let image = raw
        .enclosure_image
        .clone()
        .or_else(|| raw.media_content.clone())
        .or_else(|| raw.media_thumbnail.clone())
        .or_else(|| first_img_src(&raw.description))
        .or_else(|| first_img_src(&raw.content))
        .unwrap_or_default();

    let (category, category_id) = assign_category(&raw.categories, meta.default_category);

    let author = [Some(meta.name.as_str()), feed_title, Some(meta.id.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string();

    let source_logo = meta
        .logo
        .clone()
        .or_else(|| feed_logo.map(str::to_string))
        .filter(|s| !s.is_empty());

    Some(NewsItem {
        title,
        link,
        excerpt,
        time: format_display_time(published_at, now),
        iso_date: published_at.and_then(iso_date),
        category,
        category_id,
        image,
        author,
        source_logo,
        published_at,
    })
}

/// Free-text feed categories → (display label, taxonomy id).
fn assign_category(
    raw: &[String],
    default: Option<&'static Category>,
) -> (String, Option<String>) {
    if let Some(c) = raw.iter().find_map(|r| categories::map_free_text(r)) {
        return (c.name.to_string(), Some(c.id.to_string()));
    }
    let first_raw = raw
        .iter()
        .map(|r| normalize_text(r))
        .find(|r| !r.is_empty());
    match (first_raw, default) {
        (Some(label), d) => (label, d.map(|c| c.id.to_string())),
        (None, Some(c)) => (c.name.to_string(), Some(c.id.to_string())),
        (None, None) => (FALLBACK_CATEGORY_LABEL.to_string(), None),
    }
}

/// Normalize a whole parsed feed, capped at `limit` items.
pub fn normalize_feed(feed: ParsedFeed, meta: &SourceMeta, limit: usize, now: i64) -> Vec<NewsItem> {
    let ParsedFeed {
        title,
        logo,
        entries,
    } = feed;
    entries
        .into_iter()
        .filter_map(|e| normalize_entry(e, meta, title.as_deref(), logo.as_deref(), now))
        .take(limit)
        .collect()
}

/// Stable recency sort (undated last), then dedup by `link` keeping the first.
/// Returns (kept, dedup_count).
pub fn merge_and_dedup(mut items: Vec<NewsItem>) -> (Vec<NewsItem>, usize) {
    items.sort_by(|a, b| match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let before = items.len();
    items.retain(|it| seen.insert(it.link.clone()));
    let dedup = before - items.len();
    (items, dedup)
}

/// Outcome of one fetch pass.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub items: Vec<NewsItem>,
    pub succeeded: usize,
    pub failures: Vec<NewsError>,
    pub dedup: usize,
}

impl FetchReport {
    pub fn all_failed(&self) -> bool {
        self.succeeded == 0 && !self.failures.is_empty()
    }
}

/// Fetch every provider concurrently, each bounded by `timeout`.
/// A failing or slow source contributes zero items; this never errors.
pub async fn run_once(
    providers: &[Arc<dyn SourceProvider>],
    category_hint: Option<&str>,
    timeout: Duration,
) -> FetchReport {
    ensure_metrics_described();
    let t0 = Instant::now();
    counter!("news_fetch_runs_total").increment(1);

    let timeout_ms = timeout.as_millis() as u64;
    let calls = providers.iter().map(|p| async move {
        let res = tokio::time::timeout(timeout, p.fetch_latest(category_hint)).await;
        let res = match res {
            Ok(Ok(items)) => Ok(items),
            Ok(Err(e)) => Err(NewsError::SourceFetch {
                source_id: p.id().to_string(),
                reason: format!("{e:#}"),
            }),
            Err(_) => Err(NewsError::SourceTimeout {
                source_id: p.id().to_string(),
                timeout_ms,
            }),
        };
        (p.id().to_string(), res)
    });

    let mut report = FetchReport::default();
    let mut raw = Vec::new();
    for (source, res) in join_all(calls).await {
        match res {
            Ok(mut items) => {
                tracing::debug!(target: "news", %source, count = items.len(), "source fetched");
                report.succeeded += 1;
                raw.append(&mut items);
            }
            Err(e) => {
                tracing::warn!(target: "news", %source, error = %e, "source contributed no items");
                counter!("news_source_errors_total", "source" => source).increment(1);
                report.failures.push(e);
            }
        }
    }

    let (items, dedup) = merge_and_dedup(raw);
    report.items = items;
    report.dedup = dedup;

    if report.all_failed() {
        let e = NewsError::AllSourcesFailed(report.failures.len());
        tracing::warn!(target: "news", error = %e, "serving empty news list");
        counter!("news_all_sources_failed_total").increment(1);
    }

    counter!("news_items_fetched_total").increment(report.items.len() as u64);
    histogram!("news_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    tracing::info!(
        target: "news",
        hint = category_hint.unwrap_or("-"),
        kept = report.items.len(),
        dedup = report.dedup,
        failed = report.failures.len(),
        "fetch pass done"
    );
    report
}
