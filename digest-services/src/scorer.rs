//! Keyword importance scoring

use std::collections::HashSet;

use digest_core::{Lexicon, MatchStrategy, Tier};

/// Outcome of scoring one text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreResult {
    /// Sum of the weights of every distinct matched keyword
    pub total: u32,
    /// Whether at least one hard keyword matched
    pub matched_hard_any: bool,
    /// Categories with at least one match, in lexicon order
    pub categories: Vec<String>,
}

/// Scores texts against a lexicon
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    lexicon: &'a Lexicon,
    strategy: MatchStrategy,
}

impl<'a> Scorer<'a> {
    pub fn new(lexicon: &'a Lexicon, strategy: MatchStrategy) -> Self {
        Self { lexicon, strategy }
    }

    /// Score a text.
    ///
    /// Every matching keyword adds its weight once, however often it occurs
    /// and even if it is declared under several categories. Soft matches alone
    /// are enough to put a category in the result.
    pub fn score(&self, text: &str) -> ScoreResult {
        let mut result = ScoreResult::default();
        let mut counted: HashSet<&'a str> = HashSet::new();

        for category in self.lexicon.categories() {
            let matches = self
                .lexicon
                .matched_keywords(category, text, self.strategy);
            if matches.is_empty() {
                continue;
            }

            for m in matches {
                if counted.insert(m.keyword) {
                    result.total += m.weight;
                }
                if m.tier == Tier::Hard {
                    result.matched_hard_any = true;
                }
            }
            result.categories.push(category.clone());
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digest_core::LexiconEntry;

    fn scorer(lexicon: &Lexicon) -> Scorer<'_> {
        Scorer::new(lexicon, MatchStrategy::Substring)
    }

    #[test]
    fn test_geopolitical_text_scores_all_hard_keywords() {
        let lexicon = Lexicon::swedish_default();
        let result = scorer(&lexicon).score("Ukraina nato sanktioner krig");

        assert_eq!(result.total, 21);
        assert!(result.matched_hard_any);
        assert_eq!(
            result.categories,
            vec!["Krig / Säkerhet", "Utrikes / Geopolitik"]
        );
    }

    #[test]
    fn test_soft_only_text_keeps_category_without_hard_flag() {
        let lexicon = Lexicon::swedish_default();
        let result = scorer(&lexicon).score("börsen och arbetslöshet");

        assert_eq!(result.total, 4);
        assert!(!result.matched_hard_any);
        assert_eq!(result.categories, vec!["Ekonomi"]);
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        let lexicon = Lexicon::swedish_default();
        let s = scorer(&lexicon);
        assert_eq!(s.score("krig").total, s.score("krig krig krig").total);
    }

    #[test]
    fn test_substring_match_inside_longer_word() {
        let lexicon = Lexicon::swedish_default();
        let result = scorer(&lexicon).score("krigsförbrytelser utreds");
        // "krig" inside "krigsförbrytelser", "utredning" absent
        assert_eq!(result.total, 6);
        assert!(result.matched_hard_any);
    }

    #[test]
    fn test_word_boundary_strategy_ignores_inner_matches() {
        let lexicon = Lexicon::swedish_default();
        let result = Scorer::new(&lexicon, MatchStrategy::WordBoundary).score("krigsförbrytelser");
        assert_eq!(result, ScoreResult::default());
    }

    #[test]
    fn test_keyword_shared_by_categories_weighs_once() {
        let lexicon = Lexicon::new(
            vec![
                LexiconEntry::new("A", Tier::Hard, "storm", 4),
                LexiconEntry::new("B", Tier::Soft, "storm", 1),
            ],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        let result = scorer(&lexicon).score("Storm väntas");
        assert_eq!(result.total, 4);
        assert_eq!(result.categories, vec!["A", "B"]);
    }

    #[test]
    fn test_score_is_monotonic_in_distinct_keywords() {
        let lexicon = Lexicon::swedish_default();
        let s = scorer(&lexicon);
        let words = ["inflation", "nato", "riksdag", "eskalering", "krona", "iran"];

        let mut text = String::from("nyheter:");
        let mut previous = s.score(&text).total;
        for word in words {
            text.push(' ');
            text.push_str(word);
            let current = s.score(&text).total;
            assert!(current >= previous, "adding '{}' lowered the score", word);
            previous = current;
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let lexicon = Lexicon::swedish_default();
        let s = scorer(&lexicon);
        let text = "Regeringskris efter misstroende mot statsminister";
        assert_eq!(s.score(text), s.score(text));
    }
}
