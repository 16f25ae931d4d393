// src/i18n.rs
//! Message catalogs for display labels.
//!
//! Catalogs are TOML files keyed by locale (`config/messages/<locale>.toml`).
//! Nested tables flatten into dotted keys, so `[news.categories] world = ".."`
//! is looked up as `news.categories.world`. `en` and `fr` are compiled in;
//! files on disk override or extend them.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_LOCALE: &str = "en";
pub const ENV_MESSAGES_DIR: &str = "NEWS_MESSAGES_DIR";

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../config/messages/en.toml")),
    ("fr", include_str!("../config/messages/fr.toml")),
];

/// Lookup seam used by the resolver and the page assembler.
pub trait MessageLookup: Send + Sync {
    /// Raw lookup without fallbacks.
    fn lookup(&self, locale: &str, key: &str) -> Option<String>;

    /// Lookup with fallback to the default locale.
    fn text(&self, locale: &str, key: &str) -> Option<String> {
        self.lookup(locale, key)
            .or_else(|| self.lookup(DEFAULT_LOCALE, key))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    locales: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    /// Compiled-in catalogs only.
    pub fn embedded() -> Self {
        let mut cat = Self::default();
        for (locale, src) in EMBEDDED {
            // Embedded files are part of the build; a parse error is a bug.
            match parse_messages(src) {
                Ok(map) => cat.merge(locale, map),
                Err(e) => tracing::error!(target: "i18n", %locale, error = ?e, "embedded catalog broken"),
            }
        }
        cat
    }

    /// Embedded catalogs, then `$NEWS_MESSAGES_DIR` (or `config/messages`) on top.
    pub fn load_default() -> Self {
        let dir = std::env::var(ENV_MESSAGES_DIR).unwrap_or_else(|_| "config/messages".to_string());
        let mut cat = Self::embedded();
        if let Err(e) = cat.load_dir(Path::new(&dir)) {
            tracing::debug!(target: "i18n", %dir, error = ?e, "no message overrides loaded");
        }
        cat
    }

    /// Merge every `<locale>.toml` in `dir` into this catalog.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("reading message dir {}", dir.display()))?;
        let mut loaded = 0usize;
        for e in entries.flatten() {
            let path = e.path();
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let map = parse_messages(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            self.merge(&locale.to_ascii_lowercase(), map);
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn insert_locale_str(&mut self, locale: &str, toml_src: &str) -> Result<()> {
        let map = parse_messages(toml_src)?;
        self.merge(locale, map);
        Ok(())
    }

    fn merge(&mut self, locale: &str, map: HashMap<String, String>) {
        self.locales
            .entry(locale.to_string())
            .or_default()
            .extend(map);
    }

    pub fn locales(&self) -> Vec<String> {
        let mut v: Vec<String> = self.locales.keys().cloned().collect();
        v.sort();
        v
    }

    /// Pick a supported locale: exact, then language part (`fr-CA` → `fr`),
    /// then the default.
    pub fn negotiate(&self, requested: Option<&str>) -> String {
        let Some(req) = requested.map(|s| s.trim().to_ascii_lowercase()) else {
            return DEFAULT_LOCALE.to_string();
        };
        if self.locales.contains_key(&req) {
            return req;
        }
        let lang = req.split(['-', '_']).next().unwrap_or_default();
        if self.locales.contains_key(lang) {
            return lang.to_string();
        }
        DEFAULT_LOCALE.to_string()
    }
}

impl MessageLookup for Catalog {
    fn lookup(&self, locale: &str, key: &str) -> Option<String> {
        self.locales.get(locale).and_then(|m| m.get(key)).cloned()
    }
}

fn parse_messages(src: &str) -> Result<HashMap<String, String>> {
    let value: toml::Table = toml::from_str(src)?;
    let mut out = HashMap::new();
    flatten("", &value, &mut out)?;
    Ok(out)
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) -> Result<()> {
    for (k, v) in table {
        let key = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        match v {
            toml::Value::String(s) => {
                out.insert(key, s.clone());
            }
            toml::Value::Table(t) => flatten(&key, t, out)?,
            other => return Err(anyhow!("message `{key}` must be a string, got {}", other.type_str())),
        }
    }
    Ok(())
}
