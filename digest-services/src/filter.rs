//! Article admission filter
//!
//! A feed entry becomes an [`Article`] only if it passes every stage, in
//! order: recency, clickbait block, sport block, hard-news gate, minimum
//! score, low-priority source demotion and category presence. The first
//! failing stage decides the [`Rejection`].

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use digest_core::{Article, Lexicon, MatchStrategy};
use digest_news::{host_of, source_name, FeedEntry, TextNormalizer};

use crate::scorer::Scorer;

/// Which relevance rule an entry must satisfy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Require a hard-news term, then a hard keyword or a modest score
    #[default]
    HardNewsGate,
    /// Only require a minimum score
    ScoreOnly,
}

impl fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterPolicy::HardNewsGate => write!(f, "hard-news-gate"),
            FilterPolicy::ScoreOnly => write!(f, "score-only"),
        }
    }
}

impl std::str::FromStr for FilterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hard-news-gate" | "gate" | "a" => Ok(FilterPolicy::HardNewsGate),
            "score-only" | "score" | "b" => Ok(FilterPolicy::ScoreOnly),
            _ => Err(format!("Unknown filter policy: {}", s)),
        }
    }
}

/// Configuration for the article filter
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub policy: FilterPolicy,
    /// Entries older than `now - recency_window` are dropped
    pub recency_window: TimeDelta,
    /// `HardNewsGate`: score needed when no hard keyword matched
    pub soft_only_min_score: u32,
    /// `ScoreOnly`: score needed in every case
    pub min_score: u32,
    /// Host fragments of outlets held to a higher bar
    pub low_priority_sources: Vec<String>,
    /// Score needed by low-priority outlets
    pub low_priority_min_score: u32,
    pub strategy: MatchStrategy,
    /// Excerpt length in characters
    pub max_description_len: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            policy: FilterPolicy::HardNewsGate,
            recency_window: TimeDelta::days(1),
            soft_only_min_score: 4,
            min_score: 5,
            low_priority_sources: vec!["aftonbladet".to_string(), "expressen".to_string()],
            low_priority_min_score: 6,
            strategy: MatchStrategy::Substring,
            max_description_len: digest_news::normalize::DEFAULT_MAX_LEN,
        }
    }
}

/// Why an entry was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    /// No parsable publication date
    MissingDate,
    /// Published before the recency cutoff
    Stale,
    /// Title contains a clickbait phrase
    Clickbait,
    /// Title or body mentions sport
    Sport,
    /// No hard-news term anywhere
    NoHardNews,
    /// Score below the policy threshold
    BelowThreshold,
    /// Low-priority outlet below its raised threshold
    LowPrioritySource,
    /// No category matched
    NoCategory,
}

impl Rejection {
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::MissingDate => "missing-date",
            Rejection::Stale => "stale",
            Rejection::Clickbait => "clickbait",
            Rejection::Sport => "sport",
            Rejection::NoHardNews => "no-hard-news",
            Rejection::BelowThreshold => "below-threshold",
            Rejection::LowPrioritySource => "low-priority-source",
            Rejection::NoCategory => "no-category",
        }
    }
}

impl Serialize for Rejection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Applies the admission stages to feed entries
pub struct ArticleFilter<'a> {
    lexicon: &'a Lexicon,
    config: &'a FilterConfig,
    scorer: Scorer<'a>,
    normalizer: TextNormalizer,
    cutoff: NaiveDateTime,
}

impl<'a> ArticleFilter<'a> {
    /// Create a filter for a run started at `now` (local wall clock)
    pub fn new(lexicon: &'a Lexicon, config: &'a FilterConfig, now: NaiveDateTime) -> Self {
        Self {
            lexicon,
            config,
            scorer: Scorer::new(lexicon, config.strategy),
            normalizer: TextNormalizer::new(config.max_description_len),
            // A window reaching past the calendar admits everything
            cutoff: now
                .checked_sub_signed(config.recency_window)
                .unwrap_or(NaiveDateTime::MIN),
        }
    }

    /// Oldest accepted publication time
    pub fn cutoff(&self) -> NaiveDateTime {
        self.cutoff
    }

    /// Run every stage and build the article on success
    pub fn evaluate(&self, entry: &FeedEntry) -> Result<Article, Rejection> {
        let strategy = self.config.strategy;

        // The feed's own wall clock is compared with local time, offset ignored
        let published_at = entry
            .published
            .map(|p| p.naive_local())
            .ok_or(Rejection::MissingDate)?;
        if published_at < self.cutoff {
            return Err(Rejection::Stale);
        }

        let title = entry.title.to_lowercase();
        if strategy.contains_any(&title, self.lexicon.clickbait_phrases()) {
            return Err(Rejection::Clickbait);
        }

        let text = format!("{} {}", title, entry.body_html).to_lowercase();
        if strategy.contains_any(&text, self.lexicon.sport_terms()) {
            return Err(Rejection::Sport);
        }

        if self.config.policy == FilterPolicy::HardNewsGate
            && !strategy.contains_any(&text, self.lexicon.hard_news_terms())
        {
            return Err(Rejection::NoHardNews);
        }

        let score = self.scorer.score(&text);
        let relevant = match self.config.policy {
            FilterPolicy::HardNewsGate => {
                score.matched_hard_any || score.total >= self.config.soft_only_min_score
            }
            FilterPolicy::ScoreOnly => score.total >= self.config.min_score,
        };
        if !relevant {
            return Err(Rejection::BelowThreshold);
        }

        if self.is_low_priority(&entry.link) && score.total < self.config.low_priority_min_score {
            return Err(Rejection::LowPrioritySource);
        }

        if score.categories.is_empty() {
            return Err(Rejection::NoCategory);
        }

        debug!(
            "Accepted '{}' (score {}, {:?})",
            entry.title, score.total, score.categories
        );

        Ok(Article {
            id: article_id(&entry.link),
            title: entry.title.clone(),
            description: self.normalizer.normalize(&entry.body_html),
            link: entry.link.clone(),
            source: source_name(&entry.link),
            published_at,
            image: entry.image.clone().filter(|i| !i.is_empty()),
            categories: score.categories,
            score: score.total,
        })
    }

    /// Whether the link's host belongs to a low-priority outlet
    fn is_low_priority(&self, link: &str) -> bool {
        let host = host_of(link).unwrap_or_else(|| link.to_lowercase());
        self.config
            .low_priority_sources
            .iter()
            .any(|src| host.contains(&src.to_lowercase()))
    }
}

/// Generate ID from URL
fn article_id(link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(link.trim().as_bytes());
    hex::encode(&hasher.finalize()[..8])
}
