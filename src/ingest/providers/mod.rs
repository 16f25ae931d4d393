pub mod feed_xml;
pub mod rss;
