//! Core types for the daily news digest
//!
//! This crate defines the shared data structures used across the digest,
//! including the article representation, the keyword lexicon and the
//! text matching policy.

pub mod article;
pub mod error;
pub mod lexicon;
pub mod matching;

pub use article::Article;
pub use error::{DigestError, DigestResult, LexiconError};
pub use lexicon::{KeywordMatch, Lexicon, LexiconEntry, Tier};
pub use matching::MatchStrategy;
