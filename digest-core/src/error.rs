//! Error types for the digest

use thiserror::Error;

/// Problems found while loading or validating a lexicon
#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Keyword '{keyword}' is both hard and soft in category '{category}'")]
    OverlappingTiers { category: String, keyword: String },

    #[error("Keyword '{keyword}' in category '{category}' has non-positive weight {weight}")]
    NonPositiveWeight {
        category: String,
        keyword: String,
        weight: u32,
    },

    #[error("Empty keyword in category '{0}'")]
    EmptyKeyword(String),

    #[error("Keyword '{keyword}' declared twice in category '{category}'")]
    DuplicateKeyword { category: String, keyword: String },

    #[error("Lexicon declares no categories")]
    NoCategories,
}

/// Digest-wide error type
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DigestError {
    pub fn parse(msg: impl Into<String>) -> Self {
        DigestError::Parse(msg.into())
    }
}

/// Result type alias for digest operations
pub type DigestResult<T> = Result<T, DigestError>;
