//! # Category Taxonomy
//!
//! The closed, build-time list of news categories.
//!
//! - Every category has a slug id, a display name, a symbolic icon name,
//!   aliases (free-text labels feeds use for it) and keywords (used by the
//!   legacy keyword filter).
//! - `all` is a pseudo-category meaning "no filter"; it is not part of
//!   `CATEGORIES`.
//! - Free-text mapping order: id → name → alias → alias substring.

use serde::Serialize;

/// Pseudo-category id meaning "no filter".
pub const ALL_CATEGORY_ID: &str = "all";
/// Symbolic icon of the `all` pseudo-category.
pub const ALL_CATEGORY_ICON: &str = "LayoutGrid";
/// Display name of the `all` pseudo-category when no message is found.
pub const ALL_CATEGORY_NAME: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    #[serde(skip)]
    pub keywords: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        id: "world",
        name: "World",
        icon: "Globe",
        aliases: &["world news", "international", "global", "europe", "asia", "americas", "africa", "middle east"],
        keywords: &["world", "international", "united nations", "summit", "embassy", "refugee", "ceasefire"],
    },
    Category {
        id: "business",
        name: "Business",
        icon: "Briefcase",
        aliases: &["economy", "finance", "markets", "money", "companies"],
        keywords: &["market", "stocks", "economy", "inflation", "earnings", "startup", "bank", "trade"],
    },
    Category {
        id: "tech-science",
        name: "Tech & Science",
        icon: "Cpu",
        aliases: &["tech", "technology", "science", "ai", "space", "gadgets", "environment"],
        keywords: &["artificial intelligence", "software", "smartphone", "chip", "robot", "nasa", "space", "research", "scientists"],
    },
    Category {
        id: "entertainment",
        name: "Entertainment",
        icon: "Film",
        aliases: &["arts", "culture", "music", "movies", "film", "tv", "celebrity", "lifestyle"],
        keywords: &["movie", "film", "album", "concert", "celebrity", "netflix", "box office", "festival"],
    },
    Category {
        id: "sports",
        name: "Sports",
        icon: "Trophy",
        aliases: &["sport", "football", "soccer", "basketball", "tennis", "olympics"],
        keywords: &["match", "league", "goal", "championship", "tournament", "coach", "olympic"],
    },
    Category {
        id: "health",
        name: "Health",
        icon: "HeartPulse",
        aliases: &["medicine", "wellness", "healthcare", "fitness"],
        keywords: &["health", "vaccine", "hospital", "disease", "doctors", "medical", "virus", "diet"],
    },
    Category {
        id: "gaming",
        name: "Gaming",
        icon: "Gamepad2",
        aliases: &["games", "video games", "esports", "game"],
        keywords: &["gaming", "playstation", "xbox", "nintendo", "steam", "esports", "game"],
    },
    Category {
        id: "politics",
        name: "Politics",
        icon: "Landmark",
        aliases: &["government", "elections", "election", "policy", "us politics"],
        keywords: &["election", "parliament", "senate", "president", "minister", "congress", "vote"],
    },
];

/// Look up a taxonomy entry by exact id.
pub fn find(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// All taxonomy ids, in display order.
pub fn ids() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().map(|c| c.id)
}

/// Map a feed's free-text category label onto the taxonomy.
pub fn map_free_text(raw: &str) -> Option<&'static Category> {
    let s = normalize_label(raw);
    if s.is_empty() {
        return None;
    }

    if let Some(c) = CATEGORIES
        .iter()
        .find(|c| c.id == s || c.name.eq_ignore_ascii_case(&s))
    {
        return Some(c);
    }

    if let Some(c) = CATEGORIES.iter().find(|c| c.aliases.contains(&s.as_str())) {
        return Some(c);
    }

    // "Technology News", "World / Europe" and friends.
    CATEGORIES.iter().find(|c| {
        c.aliases
            .iter()
            .filter(|a| a.len() > 3)
            .any(|a| contains_word(&s, a))
    })
}

impl Category {
    /// Case-insensitive keyword hit on arbitrary text.
    pub fn keyword_hit(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k))
    }
}

/// Lowercase, unify separators, collapse whitespace.
fn normalize_label(s: &str) -> String {
    let mut out = s.trim().to_lowercase();
    for ch in ['_', '/', '|', '\u{2013}', '\u{2014}', '&'] {
        out = out.replace(ch, " ");
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack
        .match_indices(needle)
        .any(|(i, m)| {
            let before = haystack[..i].chars().next_back();
            let after = haystack[i + m.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
}
