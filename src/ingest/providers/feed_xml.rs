// src/ingest/providers/feed_xml.rs
//! Streaming RSS 2.0 / RDF / Atom parser.
//!
//! Feeds in the wild mix shapes (RSS items with `media:*` and `content:encoded`,
//! Atom entries with `<link href>` and `<category term>`), so this walks the
//! event stream and collects a flat `RawEntry` per `<item>`/`<entry>` instead of
//! deserializing into one fixed schema.

use anyhow::{anyhow, bail, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub description: String,
    pub content: String,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub categories: Vec<String>,
    pub enclosure_image: Option<String>,
    pub media_content: Option<String>,
    pub media_thumbnail: Option<String>,
}

impl RawEntry {
    /// Publication date, preferring explicit publish dates over update stamps.
    pub fn date(&self) -> Option<&str> {
        self.published.as_deref().or(self.updated.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub logo: Option<String>,
    pub entries: Vec<RawEntry>,
}

fn is_root(name: &str) -> bool {
    matches!(name, "rss" | "rdf:RDF" | "feed")
}

fn is_entry(name: &str) -> bool {
    matches!(name, "item" | "entry")
}

fn is_container(name: &str) -> bool {
    matches!(name, "channel" | "feed")
}

pub fn parse_feed(xml: &str) -> Result<ParsedFeed> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut feed = ParsedFeed::default();
    let mut entry: Option<RawEntry> = None;
    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = qname(&e);
                check_root(&mut saw_root, &name)?;
                if is_entry(&name) {
                    entry = Some(RawEntry::default());
                } else if let Some(en) = entry.as_mut() {
                    on_entry_attrs(en, &name, &e, parent_is_entry(&stack));
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = qname(&e);
                check_root(&mut saw_root, &name)?;
                if let Some(en) = entry.as_mut() {
                    on_entry_attrs(en, &name, &e, parent_is_entry(&stack));
                }
            }
            Ok(Event::Text(t)) => {
                let text = match t.unescape() {
                    Ok(s) => s.into_owned(),
                    // HTML entities (&nbsp; ...) are not XML entities; keep raw, decoded later.
                    Err(_) => String::from_utf8_lossy(&t).into_owned(),
                };
                on_text(&stack, text, entry.as_mut(), &mut feed);
            }
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                on_text(&stack, text, entry.as_mut(), &mut feed);
            }
            Ok(Event::End(_)) => {
                if let Some(name) = stack.pop() {
                    if is_entry(&name) {
                        if let Some(done) = entry.take() {
                            feed.entries.push(done);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow!(
                    "xml error at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }

    if !saw_root {
        bail!("document has no RSS or Atom root element");
    }
    Ok(feed)
}

fn check_root(saw_root: &mut bool, name: &str) -> Result<()> {
    if *saw_root {
        return Ok(());
    }
    if !is_root(name) {
        bail!("unsupported feed root element `{name}`");
    }
    *saw_root = true;
    Ok(())
}

fn qname(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attr(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.trim().to_string()))
        .filter(|v| !v.is_empty())
}

fn parent_is_entry(stack: &[String]) -> bool {
    stack.last().is_some_and(|n| is_entry(n))
}

fn is_image_type(t: Option<&str>) -> bool {
    t.is_some_and(|t| t.to_ascii_lowercase().starts_with("image/"))
}

fn looks_like_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default().to_ascii_lowercase();
    [".jpg", ".jpeg", ".png", ".gif", ".webp", ".avif"]
        .iter()
        .any(|ext| path.ends_with(ext))
}

/// Attribute-carrying elements inside an entry.
fn on_entry_attrs(en: &mut RawEntry, name: &str, e: &BytesStart<'_>, direct_child: bool) {
    match name {
        // Atom <link href rel type/>
        "link" if direct_child => {
            let Some(href) = attr(e, "href") else {
                return;
            };
            let rel = attr(e, "rel").unwrap_or_else(|| "alternate".to_string());
            let ty = attr(e, "type");
            match rel.as_str() {
                "alternate" if en.link.is_none() => en.link = Some(href),
                "enclosure" if is_image_type(ty.as_deref()) && en.enclosure_image.is_none() => {
                    en.enclosure_image = Some(href)
                }
                _ => {}
            }
        }
        "enclosure" => {
            let Some(url) = attr(e, "url") else {
                return;
            };
            let ty = attr(e, "type");
            let image = match ty.as_deref() {
                Some(_) => is_image_type(ty.as_deref()),
                None => looks_like_image_url(&url),
            };
            if image && en.enclosure_image.is_none() {
                en.enclosure_image = Some(url);
            }
        }
        "media:content" => {
            let Some(url) = attr(e, "url") else {
                return;
            };
            let medium = attr(e, "medium");
            let ty = attr(e, "type");
            let image = medium.as_deref() == Some("image")
                || is_image_type(ty.as_deref())
                || (medium.is_none() && ty.is_none());
            if image && en.media_content.is_none() {
                en.media_content = Some(url);
            }
        }
        "media:thumbnail" => {
            if en.media_thumbnail.is_none() {
                en.media_thumbnail = attr(e, "url");
            }
        }
        // Atom <category term label/>
        "category" if direct_child => {
            if let Some(c) = attr(e, "label").or_else(|| attr(e, "term")) {
                en.categories.push(c);
            }
        }
        _ => {}
    }
}

fn append(slot: &mut String, text: &str) {
    if !slot.is_empty() {
        slot.push(' ');
    }
    slot.push_str(text);
}

fn on_text(stack: &[String], text: String, entry: Option<&mut RawEntry>, feed: &mut ParsedFeed) {
    if text.trim().is_empty() {
        return;
    }
    let Some(current) = stack.last().map(String::as_str) else {
        return;
    };
    let parent = stack.len().checked_sub(2).map(|i| stack[i].as_str());

    if let Some(en) = entry {
        if !parent.is_some_and(is_entry) {
            return;
        }
        match current {
            "title" => append(&mut en.title, &text),
            "link" => {
                if en.link.is_none() {
                    en.link = Some(text.trim().to_string());
                }
            }
            "guid" | "id" => en.guid = Some(text.trim().to_string()),
            "description" | "summary" => append(&mut en.description, &text),
            "content:encoded" | "content" => append(&mut en.content, &text),
            "pubDate" | "published" | "dc:date" => {
                if en.published.is_none() {
                    en.published = Some(text.trim().to_string());
                }
            }
            "updated" => en.updated = Some(text.trim().to_string()),
            "category" | "dc:subject" => en.categories.push(text.trim().to_string()),
            _ => {}
        }
        return;
    }

    // Feed-level metadata.
    match (parent, current) {
        (Some(p), "title") if is_container(p) => {
            if feed.title.is_none() {
                feed.title = Some(text.trim().to_string());
            }
        }
        (Some("image"), "url") | (Some("feed"), "logo") | (Some("feed"), "icon") => {
            if feed.logo.is_none() {
                feed.logo = Some(text.trim().to_string());
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rss_item_with_media_and_cdata() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Example Wire</title>
    <atom:link href="https://example.test/feed" rel="self"/>
    <image><url>https://example.test/logo.png</url><title>Logo</title></image>
    <item>
      <title><![CDATA[Rust 2.0 &amp; beyond]]></title>
      <link>https://example.test/a</link>
      <description><![CDATA[<p>Hello <b>world</b></p>]]></description>
      <pubDate>Wed, 01 May 2024 10:00:00 +0000</pubDate>
      <category>Technology</category>
      <media:thumbnail url="https://example.test/t.jpg"/>
      <media:content url="https://example.test/big.jpg" medium="image"/>
    </item>
  </channel>
</rss>"#;
        let f = parse_feed(xml).unwrap();
        assert_eq!(f.title.as_deref(), Some("Example Wire"));
        assert_eq!(f.logo.as_deref(), Some("https://example.test/logo.png"));
        assert_eq!(f.entries.len(), 1);
        let e = &f.entries[0];
        assert_eq!(e.title, "Rust 2.0 &amp; beyond");
        assert_eq!(e.link.as_deref(), Some("https://example.test/a"));
        assert_eq!(e.categories, vec!["Technology".to_string()]);
        assert_eq!(e.media_content.as_deref(), Some("https://example.test/big.jpg"));
        assert_eq!(e.media_thumbnail.as_deref(), Some("https://example.test/t.jpg"));
        assert_eq!(e.date(), Some("Wed, 01 May 2024 10:00:00 +0000"));
    }

    #[test]
    fn atom_entry_links_and_terms() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Side</title>
  <logo>https://atom.test/logo.svg</logo>
  <entry>
    <title type="html">Atom &lt;b&gt;story&lt;/b&gt;</title>
    <link rel="enclosure" type="image/png" href="https://atom.test/img.png"/>
    <link href="https://atom.test/story"/>
    <id>tag:atom.test,2024:1</id>
    <updated>2024-05-02T08:00:00Z</updated>
    <published>2024-05-01T08:00:00Z</published>
    <category term="sport"/>
    <summary>Short summary</summary>
  </entry>
</feed>"#;
        let f = parse_feed(xml).unwrap();
        assert_eq!(f.title.as_deref(), Some("Atom Side"));
        assert_eq!(f.logo.as_deref(), Some("https://atom.test/logo.svg"));
        let e = &f.entries[0];
        assert_eq!(e.title, "Atom <b>story</b>");
        assert_eq!(e.link.as_deref(), Some("https://atom.test/story"));
        assert_eq!(e.enclosure_image.as_deref(), Some("https://atom.test/img.png"));
        assert_eq!(e.guid.as_deref(), Some("tag:atom.test,2024:1"));
        assert_eq!(e.date(), Some("2024-05-01T08:00:00Z"));
        assert_eq!(e.categories, vec!["sport".to_string()]);
        assert_eq!(e.description, "Short summary");
    }

    #[test]
    fn html_entities_do_not_abort_parsing() {
        let xml = "<rss><channel><item><title>A&nbsp;B</title><link>https://x.test/1</link></item></channel></rss>";
        let f = parse_feed(xml).unwrap();
        assert_eq!(f.entries[0].title, "A&nbsp;B");
    }

    #[test]
    fn non_feed_documents_are_rejected() {
        assert!(parse_feed("<html><body>oops</body></html>").is_err());
        assert!(parse_feed("definitely not xml").is_err());
        assert!(parse_feed("").is_err());
    }
}
