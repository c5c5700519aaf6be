//! Keyword matching policy

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a keyword is located in a piece of lower-cased text
///
/// `Substring` is the historical behaviour: a keyword matches anywhere,
/// including inside a longer word ("val" matches "valet" and "intervall").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// Plain substring containment
    #[default]
    Substring,
    /// The keyword must be surrounded by non-alphanumeric characters or text edges
    WordBoundary,
}

impl MatchStrategy {
    /// Check whether `needle` occurs in `haystack`.
    ///
    /// Both sides are expected to be lower-cased already.
    pub fn contains(&self, haystack: &str, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }

        match self {
            MatchStrategy::Substring => haystack.contains(needle),
            MatchStrategy::WordBoundary => haystack.match_indices(needle).any(|(start, m)| {
                let end = start + m.len();
                let before = haystack[..start].chars().next_back();
                let after = haystack[end..].chars().next();
                !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
            }),
        }
    }

    /// Check whether any of `needles` occurs in `haystack`
    pub fn contains_any<S: AsRef<str>>(&self, haystack: &str, needles: &[S]) -> bool {
        needles.iter().any(|n| self.contains(haystack, n.as_ref()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatchStrategy::Substring => "substring",
            MatchStrategy::WordBoundary => "word-boundary",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "substring" | "sub" => Ok(MatchStrategy::Substring),
            "word-boundary" | "word" | "words" => Ok(MatchStrategy::WordBoundary),
            _ => Err(format!("Unknown match strategy: {}", s)),
        }
    }
}
