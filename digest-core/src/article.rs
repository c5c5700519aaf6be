//! Article data structures for the daily digest

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A feed entry that passed every filter stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Short identifier (hash of the link)
    pub id: String,
    /// Article title, original casing
    pub title: String,
    /// Plain-text excerpt, capped in length
    pub description: String,
    /// Article URL
    pub link: String,
    /// Display name of the publishing site
    pub source: String,
    /// Publication time as wall clock, offset dropped
    pub published_at: NaiveDateTime,
    /// Article thumbnail/image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Matched categories in lexicon order
    pub categories: Vec<String>,
    /// Sum of matched keyword weights
    pub score: u32,
}

impl Article {
    /// Key used to detect repeated titles
    pub fn title_key(&self) -> String {
        normalize_key(&self.title)
    }

    /// Key used to detect repeated links
    pub fn link_key(&self) -> String {
        normalize_key(&self.link)
    }

    /// Whitespace tokens of the lower-cased title and description
    pub fn tokens(&self) -> Vec<String> {
        self.title
            .to_lowercase()
            .split_whitespace()
            .chain(self.description.to_lowercase().split_whitespace())
            .map(str::to_string)
            .collect()
    }
}

/// Trim and lower-case a value for identity comparisons
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn article(title: &str, description: &str) -> Article {
        Article {
            id: "abc".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            link: " HTTPS://Example.se/A ".to_string(),
            source: "Example".to_string(),
            published_at: NaiveDate::from_ymd_opt(2025, 1, 2)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .unwrap(),
            image: None,
            categories: vec![],
            score: 0,
        }
    }

    #[test]
    fn test_keys_are_trimmed_and_lowercased() {
        let a = article("  Krig i Ukraina ", "");
        assert_eq!(a.title_key(), "krig i ukraina");
        assert_eq!(a.link_key(), "https://example.se/a");
    }

    #[test]
    fn test_tokens_cover_title_and_description() {
        let a = article("Krig i Ukraina", "NATO  svarar\tsnabbt");
        assert_eq!(
            a.tokens(),
            vec!["krig", "i", "ukraina", "nato", "svarar", "snabbt"]
        );
    }
}
