//! Keyword lexicon: categories, weighted signals and block-lists
//!
//! The lexicon is a flat list of `(category, tier, keyword, weight)` records
//! plus three block-lists. It is built once at start-up and never mutated.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DigestError, DigestResult, LexiconError};
use crate::matching::MatchStrategy;

/// Signal strength of a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Strong topical signal
    Hard,
    /// Weak or contextual signal
    Soft,
}

/// One weighted keyword of a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub category: String,
    pub tier: Tier,
    pub keyword: String,
    pub weight: u32,
}

impl LexiconEntry {
    pub fn new(category: &str, tier: Tier, keyword: &str, weight: u32) -> Self {
        Self {
            category: category.to_string(),
            tier,
            keyword: keyword.to_lowercase(),
            weight,
        }
    }
}

/// A keyword found in a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch<'a> {
    pub keyword: &'a str,
    pub weight: u32,
    pub tier: Tier,
}

/// On-disk representation of a lexicon
#[derive(Debug, Deserialize)]
struct LexiconFile {
    entries: Vec<LexiconEntry>,
    #[serde(default)]
    sport_terms: Vec<String>,
    #[serde(default)]
    clickbait_phrases: Vec<String>,
    #[serde(default)]
    hard_news_terms: Vec<String>,
}

/// Immutable keyword table
#[derive(Debug, Clone, Serialize)]
pub struct Lexicon {
    /// Category names in declaration order
    categories: Vec<String>,
    entries: Vec<LexiconEntry>,
    sport_terms: Vec<String>,
    clickbait_phrases: Vec<String>,
    hard_news_terms: Vec<String>,
}

impl Lexicon {
    /// Build and validate a lexicon.
    ///
    /// Category order is the order of first appearance in `entries`.
    pub fn new(
        entries: Vec<LexiconEntry>,
        sport_terms: Vec<String>,
        clickbait_phrases: Vec<String>,
        hard_news_terms: Vec<String>,
    ) -> Result<Self, LexiconError> {
        let entries: Vec<LexiconEntry> = entries
            .into_iter()
            .map(|e| LexiconEntry {
                keyword: e.keyword.trim().to_lowercase(),
                ..e
            })
            .collect();

        let lexicon = Self {
            categories: declaration_order(&entries),
            entries,
            sport_terms: lowercase_all(sport_terms),
            clickbait_phrases: lowercase_all(clickbait_phrases),
            hard_news_terms: lowercase_all(hard_news_terms),
        };
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Parse a lexicon from its JSON representation
    pub fn from_json_str(json: &str) -> DigestResult<Self> {
        let file: LexiconFile = serde_json::from_str(json)
            .map_err(|e| DigestError::parse(format!("Invalid lexicon JSON: {}", e)))?;
        Ok(Self::new(
            file.entries,
            file.sport_terms,
            file.clickbait_phrases,
            file.hard_news_terms,
        )?)
    }

    /// Load a lexicon from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> DigestResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the table invariants
    pub fn validate(&self) -> Result<(), LexiconError> {
        if self.entries.is_empty() {
            return Err(LexiconError::NoCategories);
        }

        let mut seen: HashSet<(&str, Tier, &str)> = HashSet::new();
        for entry in &self.entries {
            if entry.keyword.is_empty() {
                return Err(LexiconError::EmptyKeyword(entry.category.clone()));
            }
            if entry.weight == 0 {
                return Err(LexiconError::NonPositiveWeight {
                    category: entry.category.clone(),
                    keyword: entry.keyword.clone(),
                    weight: entry.weight,
                });
            }

            let other_tier = match entry.tier {
                Tier::Hard => Tier::Soft,
                Tier::Soft => Tier::Hard,
            };
            if seen.contains(&(entry.category.as_str(), other_tier, entry.keyword.as_str())) {
                return Err(LexiconError::OverlappingTiers {
                    category: entry.category.clone(),
                    keyword: entry.keyword.clone(),
                });
            }
            if !seen.insert((entry.category.as_str(), entry.tier, entry.keyword.as_str())) {
                return Err(LexiconError::DuplicateKeyword {
                    category: entry.category.clone(),
                    keyword: entry.keyword.clone(),
                });
            }
        }

        Ok(())
    }

    /// Category names in declaration order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    /// All records of one category, hard and soft
    pub fn entries_for<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a LexiconEntry> + 'a {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Keywords of `category` occurring in `text` (case-insensitive)
    pub fn matched_keywords(
        &self,
        category: &str,
        text: &str,
        strategy: MatchStrategy,
    ) -> Vec<KeywordMatch<'_>> {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .filter(|e| strategy.contains(&text, &e.keyword))
            .map(|e| KeywordMatch {
                keyword: &e.keyword,
                weight: e.weight,
                tier: e.tier,
            })
            .collect()
    }

    /// Hard weight of an exact token in `category`, zero when absent
    pub fn hard_weight(&self, category: &str, token: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.category == category && e.tier == Tier::Hard && e.keyword == token)
            .map(|e| e.weight)
            .unwrap_or(0)
    }

    pub fn sport_terms(&self) -> &[String] {
        &self.sport_terms
    }

    pub fn clickbait_phrases(&self) -> &[String] {
        &self.clickbait_phrases
    }

    /// Vocabulary that marks an article as hard news regardless of category
    pub fn hard_news_terms(&self) -> &[String] {
        &self.hard_news_terms
    }

    /// Built-in Swedish news lexicon
    pub fn swedish_default() -> Self {
        let entries: Vec<LexiconEntry> = SWEDISH_TABLE
            .iter()
            .flat_map(|(category, hard, soft)| {
                hard.iter()
                    .map(move |(k, w)| LexiconEntry::new(category, Tier::Hard, k, *w))
                    .chain(
                        soft.iter()
                            .map(move |(k, w)| LexiconEntry::new(category, Tier::Soft, k, *w)),
                    )
            })
            .collect();

        Self {
            categories: declaration_order(&entries),
            entries,
            sport_terms: to_owned(SPORT_TERMS),
            clickbait_phrases: to_owned(CLICKBAIT_PHRASES),
            hard_news_terms: to_owned(HARD_NEWS_TERMS),
        }
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::swedish_default()
    }
}

fn declaration_order(entries: &[LexiconEntry]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for entry in entries {
        if !categories.contains(&entry.category) {
            categories.push(entry.category.clone());
        }
    }
    categories
}

fn lowercase_all(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn to_owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|s| s.to_string()).collect()
}

type WeightedTerms = &'static [(&'static str, u32)];

const SWEDISH_TABLE: &[(&str, WeightedTerms, WeightedTerms)] = &[
    (
        "Ekonomi",
        &[
            ("styrränta", 5),
            ("räntebesked", 5),
            ("inflation", 4),
            ("recession", 5),
            ("finanskris", 5),
            ("centralbank", 4),
            ("statsbudget", 4),
            ("skattehöjning", 4),
        ],
        &[("bnp", 2), ("börs", 2), ("arbetslöshet", 2), ("krona", 1)],
    ),
    (
        "Krig / Säkerhet",
        &[
            ("krig", 6),
            ("invasion", 6),
            ("flyganfall", 6),
            ("missilattack", 6),
            ("terrorattack", 6),
            ("mobilisering", 5),
            ("undantagstillstånd", 5),
            ("kärnvapen", 6),
        ],
        &[
            ("militär", 2),
            ("frontlinje", 2),
            ("eskalering", 3),
            ("vapenvila", 2),
        ],
    ),
    (
        "Utrikes / Geopolitik",
        &[
            ("usa", 4),
            ("kina", 4),
            ("ryssland", 5),
            ("ukraina", 5),
            ("israel", 5),
            ("iran", 5),
            ("nato", 5),
            ("sanktioner", 5),
            ("eu-toppmöte", 4),
        ],
        &[
            ("utrikesminister", 2),
            ("fredssamtal", 2),
            ("allierade", 2),
            ("utrikespolitik", 2),
        ],
    ),
    (
        "Politik / Stat",
        &[
            ("regeringskris", 6),
            ("misstroende", 6),
            ("statsminister", 5),
            ("val", 5),
            ("undantagslag", 6),
            ("statskupp", 6),
        ],
        &[("riksdag", 2), ("minister", 2), ("utredning", 1)],
    ),
];

const HARD_NEWS_TERMS: &[&str] = &[
    "krig",
    "invasion",
    "terrorattack",
    "flyganfall",
    "missil",
    "kärnvapen",
    "mobilisering",
    "undantagstillstånd",
    "sanktioner",
    "nato",
    "styrränta",
    "räntebesked",
    "regeringskris",
    "statskupp",
];

const SPORT_TERMS: &[&str] = &[
    "fotboll",
    "match",
    "mål",
    "vann",
    "förlorade",
    "föll",
    "premier league",
    "champions league",
    "allsvenskan",
    "arsenal",
    "united",
    "chelsea",
    "liverpool",
    "aik",
    "djurgården",
    "malmö ff",
    "hockey",
    "shl",
    "nhl",
    "tennis",
    "basket",
];

const CLICKBAIT_PHRASES: &[&str] = &[
    "så", "därför", "här är", "lista", "bilder", "du måste", "chock", "otroliga", "avslöjar",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_is_valid() {
        let lexicon = Lexicon::swedish_default();
        assert!(lexicon.validate().is_ok());
        assert_eq!(
            lexicon.categories(),
            &[
                "Ekonomi",
                "Krig / Säkerhet",
                "Utrikes / Geopolitik",
                "Politik / Stat"
            ]
        );
        assert_eq!(lexicon.hard_news_terms().len(), 14);
        assert_eq!(lexicon.sport_terms().len(), 21);
        assert_eq!(lexicon.clickbait_phrases().len(), 9);
    }

    #[test]
    fn test_matched_keywords_is_case_insensitive_substring() {
        let lexicon = Lexicon::swedish_default();
        let matches = lexicon.matched_keywords(
            "Krig / Säkerhet",
            "KRIGET eskalerar, MILITÄR närvaro",
            MatchStrategy::Substring,
        );
        let keywords: Vec<&str> = matches.iter().map(|m| m.keyword).collect();
        assert_eq!(keywords, vec!["krig", "militär"]);
        assert_eq!(matches[0].tier, Tier::Hard);
        assert_eq!(matches[1].tier, Tier::Soft);
        assert_eq!(matches[1].weight, 2);
    }

    #[test]
    fn test_matched_keywords_word_boundary() {
        let lexicon = Lexicon::swedish_default();
        let matches = lexicon.matched_keywords(
            "Krig / Säkerhet",
            "kriget eskalerar",
            MatchStrategy::WordBoundary,
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn test_hard_weight_is_exact_token() {
        let lexicon = Lexicon::swedish_default();
        assert_eq!(lexicon.hard_weight("Krig / Säkerhet", "krig"), 6);
        assert_eq!(lexicon.hard_weight("Krig / Säkerhet", "kriget"), 0);
        // soft keywords carry no hard weight
        assert_eq!(lexicon.hard_weight("Krig / Säkerhet", "militär"), 0);
        assert_eq!(lexicon.hard_weight("Ekonomi", "krig"), 0);
    }

    #[test]
    fn test_overlapping_tiers_rejected() {
        let result = Lexicon::new(
            vec![
                LexiconEntry::new("A", Tier::Hard, "x", 3),
                LexiconEntry::new("A", Tier::Soft, "X", 1),
            ],
            vec![],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(LexiconError::OverlappingTiers { .. })));
    }

    #[test]
    fn test_same_keyword_in_two_categories_allowed() {
        let lexicon = Lexicon::new(
            vec![
                LexiconEntry::new("A", Tier::Hard, "x", 3),
                LexiconEntry::new("B", Tier::Soft, "x", 1),
            ],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(lexicon.categories(), &["A", "B"]);
    }

    #[test]
    fn test_zero_weight_rejected() {
        let result = Lexicon::new(
            vec![LexiconEntry::new("A", Tier::Hard, "x", 0)],
            vec![],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(LexiconError::NonPositiveWeight { .. })));
    }

    #[test]
    fn test_empty_lexicon_rejected() {
        let result = Lexicon::new(vec![], vec![], vec![], vec![]);
        assert!(matches!(result, Err(LexiconError::NoCategories)));
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "entries": [
                {"category": "Väder", "tier": "hard", "keyword": "Storm", "weight": 4},
                {"category": "Väder", "tier": "soft", "keyword": "regn", "weight": 1}
            ],
            "clickbait_phrases": ["Chock"]
        }"#;
        let lexicon = Lexicon::from_json_str(json).unwrap();
        assert_eq!(lexicon.categories(), &["Väder"]);
        assert_eq!(lexicon.entries()[0].keyword, "storm");
        assert_eq!(lexicon.clickbait_phrases(), &["chock"]);
        assert!(lexicon.sport_terms().is_empty());
    }

    #[test]
    fn test_from_json_str_rejects_negative_weight() {
        let json = r#"{"entries": [{"category": "A", "tier": "hard", "keyword": "x", "weight": -2}]}"#;
        assert!(matches!(
            Lexicon::from_json_str(json),
            Err(DigestError::Parse(_))
        ));
    }
}
