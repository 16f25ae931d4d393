// src/resolver.rs
//! Category resolver: validate a requested category id against the taxonomy
//! and attach display metadata (localized label + glyph).

use serde::Serialize;

use crate::categories::{self, Category, ALL_CATEGORY_ICON, ALL_CATEGORY_ID, ALL_CATEGORY_NAME};
use crate::error::NewsError;
use crate::i18n::MessageLookup;
use crate::icons;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCategory {
    pub id: String,
    pub label: String,
    /// Symbolic icon name as declared in the taxonomy.
    pub icon_name: &'static str,
    /// Display glyph from the allow-listed icon table.
    pub icon: &'static str,
    #[serde(skip)]
    pub entry: Option<&'static Category>,
}

impl ResolvedCategory {
    pub fn is_all(&self) -> bool {
        self.entry.is_none()
    }

    /// The synthetic "no filter" category.
    pub fn all(messages: &dyn MessageLookup, locale: &str) -> Self {
        Self {
            id: ALL_CATEGORY_ID.to_string(),
            label: label_for(messages, locale, ALL_CATEGORY_ID, ALL_CATEGORY_NAME),
            icon_name: ALL_CATEGORY_ICON,
            icon: icons::glyph_for(ALL_CATEGORY_ICON),
            entry: None,
        }
    }

    pub fn from_entry(entry: &'static Category, messages: &dyn MessageLookup, locale: &str) -> Self {
        Self {
            id: entry.id.to_string(),
            label: label_for(messages, locale, entry.id, entry.name),
            icon_name: entry.icon,
            icon: icons::glyph_for(entry.icon),
            entry: Some(entry),
        }
    }
}

/// Validate `category_id` (absent/blank → `all`). Unknown ids are a hard
/// `CategoryNotFound`, never a soft fallback.
pub fn resolve_category(
    category_id: Option<&str>,
    messages: &dyn MessageLookup,
    locale: &str,
) -> Result<ResolvedCategory, NewsError> {
    let id = category_id.map(str::trim).unwrap_or_default();
    if id.is_empty() || id == ALL_CATEGORY_ID {
        return Ok(ResolvedCategory::all(messages, locale));
    }
    match categories::find(id) {
        Some(entry) => Ok(ResolvedCategory::from_entry(entry, messages, locale)),
        None => {
            tracing::debug!(target: "news", category = %id, "unknown category requested");
            Err(NewsError::CategoryNotFound(id.to_string()))
        }
    }
}

/// `all` followed by every taxonomy entry, for sidebars and listings.
pub fn all_resolved(messages: &dyn MessageLookup, locale: &str) -> Vec<ResolvedCategory> {
    std::iter::once(ResolvedCategory::all(messages, locale))
        .chain(
            categories::CATEGORIES
                .iter()
                .map(|c| ResolvedCategory::from_entry(c, messages, locale)),
        )
        .collect()
}

fn label_for(messages: &dyn MessageLookup, locale: &str, id: &str, fallback: &str) -> String {
    messages
        .text(locale, &format!("news.categories.{id}"))
        .unwrap_or_else(|| fallback.to_string())
}
