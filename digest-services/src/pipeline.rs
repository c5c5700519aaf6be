//! End-to-end digest run: fetch, admit, deduplicate, rank

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use digest_core::{Article, Lexicon};
use digest_news::{FeedEntry, FeedSource, NewsError, RssFeed};

use crate::dedup::dedupe;
use crate::filter::{ArticleFilter, FilterConfig, Rejection};
use crate::ranker::{Digest, RankPolicy, Ranker, TieBreak};

/// Result of fetching a single feed
#[derive(Debug)]
pub struct FeedOutcome {
    pub feed: RssFeed,
    pub result: Result<Vec<FeedEntry>, NewsError>,
}

/// Counters describing one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub feeds_total: usize,
    /// Names of the feeds that could not be fetched or parsed
    pub feeds_failed: Vec<String>,
    pub entries_seen: usize,
    pub accepted: usize,
    pub rejected: BTreeMap<Rejection, usize>,
    pub duplicates_removed: usize,
    pub selected: usize,
}

impl RunReport {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Articles admitted so far, plus the running report
#[derive(Debug, Default)]
pub struct Accumulator {
    pub articles: Vec<Article>,
    pub report: RunReport,
}

/// Fold one feed's outcome into the accumulator.
///
/// A failed feed is recorded and contributes nothing; the others are
/// unaffected.
pub fn absorb_feed(mut acc: Accumulator, outcome: FeedOutcome, filter: &ArticleFilter<'_>) -> Accumulator {
    acc.report.feeds_total += 1;

    let entries = match outcome.result {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to fetch feed {}: {}", outcome.feed.name, e);
            acc.report.feeds_failed.push(outcome.feed.name);
            return acc;
        }
    };

    debug!("{} entries from {}", entries.len(), outcome.feed.name);
    for entry in &entries {
        acc.report.entries_seen += 1;
        match filter.evaluate(entry) {
            Ok(article) => {
                acc.report.accepted += 1;
                acc.articles.push(article);
            }
            Err(reason) => *acc.report.rejected.entry(reason).or_insert(0) += 1,
        }
    }

    acc
}

/// A configured digest run
#[derive(Debug, Clone)]
pub struct DigestPipeline {
    pub lexicon: Lexicon,
    pub filter_config: FilterConfig,
    pub rank_policy: RankPolicy,
    pub tie_break: TieBreak,
}

impl DigestPipeline {
    pub fn new(lexicon: Lexicon, filter_config: FilterConfig) -> Self {
        Self {
            lexicon,
            filter_config,
            rank_policy: RankPolicy::default(),
            tie_break: TieBreak::default(),
        }
    }

    pub fn with_rank_policy(mut self, policy: RankPolicy) -> Self {
        self.rank_policy = policy;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Fetch every feed in order and build the digest.
    ///
    /// Feeds are fetched one after another so the merged entry order is
    /// the configured feed order.
    #[instrument(skip_all, fields(feeds = feeds.len()))]
    pub async fn run<S>(&self, source: &S, feeds: &[RssFeed], now: NaiveDateTime) -> (Digest, RunReport)
    where
        S: FeedSource + ?Sized,
    {
        let filter = ArticleFilter::new(&self.lexicon, &self.filter_config, now);
        let mut acc = Accumulator::default();

        for feed in feeds {
            let result = source.fetch_entries(feed).await;
            acc = absorb_feed(
                acc,
                FeedOutcome {
                    feed: feed.clone(),
                    result,
                },
                &filter,
            );
        }

        if !feeds.is_empty() && acc.report.feeds_failed.len() == feeds.len() {
            warn!("Every feed failed, the digest will be empty");
        }

        let (digest, report) = self.select(acc);
        info!(
            "Selected {} of {} entries ({} accepted, {} duplicates, {} feeds failed)",
            report.selected,
            report.entries_seen,
            report.accepted,
            report.duplicates_removed,
            report.feeds_failed.len()
        );
        (digest, report)
    }

    /// Deduplicate and rank the accumulated articles
    pub fn select(&self, acc: Accumulator) -> (Digest, RunReport) {
        let Accumulator { articles, mut report } = acc;

        let before = articles.len();
        let unique = dedupe(articles);
        report.duplicates_removed = before - unique.len();

        let digest = Ranker::new(&self.lexicon, self.rank_policy, self.tie_break).rank(unique);
        report.selected = digest.len();

        (digest, report)
    }
}
