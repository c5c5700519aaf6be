//! Business logic services for the daily digest
//!
//! This crate turns raw feed entries into a ranked digest: scoring,
//! filtering, deduplication, allocation into categories, HTML rendering
//! and email delivery.

pub mod dedup;
pub mod filter;
pub mod mailer;
pub mod pipeline;
pub mod ranker;
pub mod render;
pub mod scorer;

pub use dedup::dedupe;
pub use filter::{ArticleFilter, FilterConfig, FilterPolicy, Rejection};
pub use mailer::{subject_for, MailConfig, MailError, Mailer};
pub use pipeline::{absorb_feed, Accumulator, DigestPipeline, FeedOutcome, RunReport};
pub use ranker::{Digest, DigestSection, RankPolicy, Ranker, TieBreak};
pub use render::render_html;
pub use scorer::{ScoreResult, Scorer};
