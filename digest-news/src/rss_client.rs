//! RSS Feed Client for the daily digest
//!
//! Fetches and parses RSS/Atom feeds from the configured news sources.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use regex::{Captures, Regex};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::NewsError;
use crate::normalize::extract_image_from_html;
use crate::source::host_of;
use crate::types::FeedEntry;

/// Default request timeout for a single feed
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

static ATOM_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(updated|published)(\s[^>]*)?>([^<]*)</(?:updated|published)>")
        .expect("atom date pattern is valid")
});

/// RSS feed definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssFeed {
    /// Name of the source
    pub name: String,
    /// RSS feed URL
    pub url: String,
}

impl RssFeed {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Feed named after its host
    pub fn from_url(url: &str) -> Self {
        let name = host_of(url).unwrap_or_else(|| url.to_string());
        Self {
            name,
            url: url.to_string(),
        }
    }
}

/// Swedish news feeds polled by default, in processing order
pub fn default_feeds() -> Vec<RssFeed> {
    vec![
        RssFeed::new("SVT Nyheter", "https://www.svt.se/nyheter/rss.xml"),
        RssFeed::new("DN", "https://www.dn.se/m/rss/"),
        RssFeed::new("Sveriges Radio", "https://sverigesradio.se/rss.xml"),
        RssFeed::new("Dagens industri", "https://www.di.se/rss/"),
        RssFeed::new("Affärsvärlden", "https://www.affarsvarlden.se/rss"),
        RssFeed::new("SVT Inrikes", "https://www.svt.se/nyheter/inrikes/rss.xml"),
        RssFeed::new("DN Utrikes", "https://www.dn.se/nyheter/utrikes/m/rss/"),
        RssFeed::new("Ekot Utrikes", "https://sverigesradio.se/rss/ekot/utrikes"),
        RssFeed::new("Omni Inrikes", "https://omni.se/rss/inrikes"),
        RssFeed::new("Omni Utrikes", "https://omni.se/rss/utrikes"),
        RssFeed::new("Omni Ekonomi", "https://omni.se/rss/ekonomi"),
    ]
}

/// Anything that can turn a feed into entries
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse one feed. Either every entry is returned or an error.
    async fn fetch_entries(&self, feed: &RssFeed) -> Result<Vec<FeedEntry>, NewsError>;
}

/// RSS feed client
pub struct RssClient {
    client: Client,
}

impl RssClient {
    /// Create a new RSS client with the default timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for RssClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for RssClient {
    #[instrument(skip(self, feed), fields(feed = %feed.name))]
    async fn fetch_entries(&self, feed: &RssFeed) -> Result<Vec<FeedEntry>, NewsError> {
        if host_of(&feed.url).is_none() {
            return Err(NewsError::InvalidConfig(format!(
                "Invalid feed URL: {}",
                feed.url
            )));
        }

        let response = self
            .client
            .get(&feed.url)
            .header("User-Agent", "DagensDigest/1.0")
            .send()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NewsError::ApiError {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", feed.url),
            });
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        let entries = parse_feed(&content).map_err(|e| match e {
            NewsError::ParseError(_) => {
                NewsError::ParseError(format!("Failed to parse feed: {}", feed.url))
            }
            other => other,
        })?;
        debug!("Parsed {} entries from {}", entries.len(), feed.name);
        Ok(entries)
    }
}

/// Parse a feed body, trying RSS first and then Atom
pub fn parse_feed(content: &[u8]) -> Result<Vec<FeedEntry>, NewsError> {
    if let Ok(channel) = rss::Channel::read_from(content) {
        return Ok(parse_rss_channel(&channel));
    }

    if let Ok(atom_feed) = atom_syndication::Feed::read_from(content) {
        return Ok(parse_atom_feed(&atom_feed));
    }

    // One malformed timestamp fails the whole Atom document, so retry with
    // the timestamps rewritten or dropped per element
    let repaired = repair_atom_dates(&String::from_utf8_lossy(content));
    if let Ok(atom_feed) = atom_syndication::Feed::read_from(repaired.as_bytes()) {
        return Ok(parse_atom_feed(&atom_feed));
    }

    Err(NewsError::ParseError(
        "Body is neither RSS nor Atom".to_string(),
    ))
}

/// Parse RSS channel into FeedEntries
fn parse_rss_channel(channel: &rss::Channel) -> Vec<FeedEntry> {
    channel
        .items()
        .iter()
        .map(|item| {
            let summary_html = item.description().unwrap_or_default().to_string();
            let body_html = item
                .content()
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| summary_html.clone());

            // Image sources, in order:
            // 1. media:content
            // 2. media:thumbnail
            // 3. Enclosure with an image mime type
            // 4. First <img> in the description HTML
            let image = extract_media(item, "content")
                .or_else(|| extract_media(item, "thumbnail"))
                .or_else(|| {
                    item.enclosure()
                        .filter(|e| e.mime_type().contains("image"))
                        .map(|e| e.url().to_string())
                })
                .or_else(|| extract_image_from_html(&summary_html));

            FeedEntry {
                title: item.title().unwrap_or_default().to_string(),
                link: item.link().unwrap_or_default().to_string(),
                published: item.pub_date().and_then(parse_date),
                body_html,
                summary_html,
                image,
            }
        })
        .collect()
}

/// Parse Atom feed into FeedEntries
fn parse_atom_feed(atom_feed: &atom_syndication::Feed) -> Vec<FeedEntry> {
    atom_feed
        .entries()
        .iter()
        .map(|entry| {
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(|l| l.href().to_string())
                .unwrap_or_default();

            let summary_html = entry
                .summary()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default();
            let content_html = entry
                .content()
                .and_then(|c| c.value())
                .unwrap_or_default()
                .to_string();
            let body_html = if content_html.is_empty() {
                summary_html.clone()
            } else {
                content_html.clone()
            };

            let image = entry
                .links()
                .iter()
                .find(|l| {
                    l.rel() == "enclosure" && l.mime_type().is_some_and(|m| m.contains("image"))
                })
                .map(|l| l.href().to_string())
                .or_else(|| extract_image_from_html(&summary_html))
                .or_else(|| extract_image_from_html(&content_html));

            FeedEntry {
                title: entry.title().as_str().to_string(),
                link,
                published: atom_entry_date(entry),
                body_html,
                summary_html,
                image,
            }
        })
        .collect()
}

/// Publication time of an Atom entry; a missing timestamp reads as the epoch
fn atom_entry_date(entry: &atom_syndication::Entry) -> Option<DateTime<FixedOffset>> {
    entry
        .published()
        .copied()
        .filter(|d| d.timestamp() != 0)
        .or_else(|| Some(*entry.updated()))
        .filter(|d| d.timestamp() != 0)
}

/// Rewrite `<updated>`/`<published>` values as RFC 3339, dropping the
/// elements whose value is not a recognizable date
fn repair_atom_dates(xml: &str) -> String {
    ATOM_DATE_RE
        .replace_all(xml, |caps: &Captures| match parse_date(&caps[3]) {
            Some(date) => format!(
                "<{}{}>{}</{}>",
                &caps[1],
                caps.get(2).map_or("", |m| m.as_str()),
                date.to_rfc3339(),
                &caps[1]
            ),
            None => String::new(),
        })
        .into_owned()
}

/// Parse a feed date: RFC 2822 as RSS prescribes, RFC 3339 as a fallback
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

/// First `url` attribute of a `media:*` extension element
fn extract_media(item: &rss::Item, element: &str) -> Option<String> {
    item.extensions()
        .get("media")?
        .get(element)?
        .iter()
        .find_map(|ext| ext.attrs().get("url").cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:media="http://search.yahoo.com/mrss/"
     xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Nyheter</title>
    <link>https://www.svt.se</link>
    <description>Test</description>
    <item>
      <title>Krig i Ukraina</title>
      <link>https://www.svt.se/nyheter/1</link>
      <pubDate>Tue, 14 Jan 2025 08:30:00 +0100</pubDate>
      <description><![CDATA[<p>Kort <img src="https://img.se/desc.jpg"></p>]]></description>
      <content:encoded><![CDATA[<p>Lång brödtext</p>]]></content:encoded>
      <media:thumbnail url="https://img.se/thumb.jpg"/>
    </item>
    <item>
      <title>Utan datum</title>
      <link>https://www.svt.se/nyheter/2</link>
      <pubDate>igår</pubDate>
      <description>Bara sammanfattning</description>
      <enclosure url="https://img.se/enc.png" length="10" type="image/png"/>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom</title>
  <id>urn:feed</id>
  <updated>2025-01-14T09:00:00+01:00</updated>
  <entry>
    <title>Nato samlas</title>
    <id>urn:1</id>
    <link rel="alternate" href="https://omni.se/a/1"/>
    <updated>2025-01-14T09:00:00+01:00</updated>
    <summary type="html">&lt;p&gt;Sammanfattning &lt;img src="https://img.se/atom.jpg"&gt;&lt;/p&gt;</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_entries() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title, "Krig i Ukraina");
        assert_eq!(first.link, "https://www.svt.se/nyheter/1");
        assert_eq!(first.body_html, "<p>Lång brödtext</p>");
        assert!(first.summary_html.contains("Kort"));
        assert_eq!(first.image.as_deref(), Some("https://img.se/thumb.jpg"));
        let published = first.published.unwrap();
        assert_eq!(published.to_rfc3339(), "2025-01-14T08:30:00+01:00");
    }

    #[test]
    fn test_rss_unparsable_date_and_enclosure_image() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        let second = &entries[1];
        assert!(second.published.is_none());
        assert_eq!(second.body_html, "Bara sammanfattning");
        assert_eq!(second.image.as_deref(), Some("https://img.se/enc.png"));
    }

    #[test]
    fn test_parse_atom_entries() {
        let entries = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title, "Nato samlas");
        assert_eq!(entry.link, "https://omni.se/a/1");
        assert!(entry.published.is_some());
        assert_eq!(entry.image.as_deref(), Some("https://img.se/atom.jpg"));
    }

    const ATOM_MIXED_DATES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom</title>
  <id>urn:feed</id>
  <updated>2025-01-14T09:00:00+01:00</updated>
  <entry>
    <title>Nato samlas</title>
    <id>urn:1</id>
    <link href="https://omni.se/a/1"/>
    <updated>2025-01-14T09:00:00+01:00</updated>
  </entry>
  <entry>
    <title>Oklart datum</title>
    <id>urn:2</id>
    <link href="https://omni.se/a/2"/>
    <updated>igår</updated>
  </entry>
  <entry>
    <title>Gammalt format</title>
    <id>urn:3</id>
    <link href="https://omni.se/a/3"/>
    <published>Tue, 14 Jan 2025 08:30:00 +0100</published>
    <updated>2025-01-14T08:30:00+01:00</updated>
  </entry>
  <entry>
    <title>Inget datum</title>
    <id>urn:4</id>
    <link href="https://omni.se/a/4"/>
  </entry>
</feed>"#;

    #[test]
    fn test_atom_bad_entry_date_keeps_other_entries() {
        let entries = parse_feed(ATOM_MIXED_DATES.as_bytes()).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Nato samlas", "Oklart datum", "Gammalt format", "Inget datum"]);

        assert_eq!(
            entries[0].published.map(|d| d.to_rfc3339()).as_deref(),
            Some("2025-01-14T09:00:00+01:00")
        );
        assert!(entries[1].published.is_none());
        assert_eq!(
            entries[2].published.map(|d| d.to_rfc3339()).as_deref(),
            Some("2025-01-14T08:30:00+01:00")
        );
        assert!(entries[3].published.is_none());
    }

    #[test]
    fn test_repair_atom_dates() {
        let xml = "<updated>igår</updated><published type=\"x\">Tue, 14 Jan 2025 08:30:00 +0100</published>";
        assert_eq!(
            repair_atom_dates(xml),
            "<published type=\"x\">2025-01-14T08:30:00+01:00</published>"
        );
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(matches!(
            parse_feed(b"<html>not a feed</html>"),
            Err(NewsError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("Tue, 14 Jan 2025 08:30:00 GMT").is_some());
        assert!(parse_date(" 2025-01-14T08:30:00Z ").is_some());
        assert!(parse_date("").is_none());
        assert!(parse_date("14/01/2025").is_none());
    }

    #[test]
    fn test_default_feeds() {
        let feeds = default_feeds();
        assert_eq!(feeds.len(), 11);
        assert!(feeds.iter().any(|f| f.url.contains("omni.se")));
    }

    #[tokio::test]
    async fn test_invalid_feed_url_rejected_before_request() {
        let client = RssClient::new();
        let result = client.fetch_entries(&RssFeed::new("Trasig", "inte en url")).await;
        assert!(matches!(result, Err(NewsError::InvalidConfig(_))));
    }

    #[test]
    fn test_feed_from_url() {
        let feed = RssFeed::from_url("https://www.svt.se/nyheter/rss.xml");
        assert_eq!(feed.name, "www.svt.se");
    }
}
