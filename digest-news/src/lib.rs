//! Feed clients and text helpers for the daily digest
//!
//! This crate provides:
//! - RSS/Atom fetching from the configured news sources
//! - Normalization of feed markup into plain excerpts
//! - Best-effort image and source extraction

pub mod error;
pub mod normalize;
pub mod rss_client;
pub mod source;
pub mod types;

pub use error::NewsError;
pub use normalize::{extract_image_from_html, TextNormalizer};
pub use rss_client::{default_feeds, parse_feed, FeedSource, RssClient, RssFeed, DEFAULT_FETCH_TIMEOUT};
pub use source::{host_of, source_name};
pub use types::FeedEntry;
