//! Raw feed entry as handed to the digest pipeline

use chrono::{DateTime, FixedOffset};

/// One item of an RSS channel or Atom feed, before any filtering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    /// Entry title, original casing
    pub title: String,
    /// Entry URL
    pub link: String,
    /// Publication date, `None` when missing or unparsable
    pub published: Option<DateTime<FixedOffset>>,
    /// Full body markup: content when present, otherwise the summary
    pub body_html: String,
    /// Summary/description markup
    pub summary_html: String,
    /// Best-effort image URL
    pub image: Option<String>,
}
