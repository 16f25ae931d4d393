//! Allow-listed icon lookup: symbolic icon names → display glyphs.
//!
//! Only names listed here resolve; anything else gets `DEFAULT_GLYPH`.

pub const DEFAULT_GLYPH: &str = "📰";

const ICONS: &[(&str, &str)] = &[
    ("LayoutGrid", "🗞️"),
    ("Globe", "🌍"),
    ("Briefcase", "💼"),
    ("Cpu", "🔬"),
    ("Film", "🎬"),
    ("Trophy", "🏆"),
    ("HeartPulse", "🩺"),
    ("Gamepad2", "🎮"),
    ("Landmark", "🏛️"),
    ("Newspaper", DEFAULT_GLYPH),
];

/// Resolve a symbolic icon name. Unknown names fall back to the default glyph.
pub fn glyph_for(name: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, g)| *g)
        .unwrap_or(DEFAULT_GLYPH)
}

/// Whether `name` is allow-listed; taxonomy icons are checked against this.
pub fn is_known(name: &str) -> bool {
    ICONS.iter().any(|(k, _)| *k == name)
}
