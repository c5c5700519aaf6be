//! Ranking and allocation of articles into the digest

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use digest_core::{Article, Lexicon};

/// How the surviving articles are limited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankPolicy {
    /// Each article goes to its best category; every category has a cap
    PerCategory { max_per_category: usize },
    /// A single flat list of the highest scores
    GlobalTopN { limit: usize },
}

impl Default for RankPolicy {
    fn default() -> Self {
        RankPolicy::PerCategory {
            max_per_category: 5,
        }
    }
}

/// Which category wins when several have the same hard-keyword weight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// The first category in lexicon declaration order
    #[default]
    LexiconOrder,
    /// The alphabetically smallest category name
    Lexicographic,
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::LexiconOrder => write!(f, "lexicon-order"),
            TieBreak::Lexicographic => write!(f, "lexicographic"),
        }
    }
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexicon-order" | "lexicon" => Ok(TieBreak::LexiconOrder),
            "lexicographic" | "alphabetical" => Ok(TieBreak::Lexicographic),
            _ => Err(format!("Unknown tie-break: {}", s)),
        }
    }
}

/// A group of articles under one heading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestSection {
    /// Category name, `None` for a flat list
    pub heading: Option<String>,
    pub articles: Vec<Article>,
}

/// The final selection of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Digest {
    pub sections: Vec<DigestSection>,
}

impl Digest {
    /// Number of selected articles
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All selected articles, section by section
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.sections.iter().flat_map(|s| s.articles.iter())
    }
}

/// Orders and limits articles according to a [`RankPolicy`]
#[derive(Debug, Clone, Copy)]
pub struct Ranker<'a> {
    lexicon: &'a Lexicon,
    policy: RankPolicy,
    tie_break: TieBreak,
}

impl<'a> Ranker<'a> {
    pub fn new(lexicon: &'a Lexicon, policy: RankPolicy, tie_break: TieBreak) -> Self {
        Self {
            lexicon,
            policy,
            tie_break,
        }
    }

    /// Build the digest from deduplicated articles
    pub fn rank(&self, articles: Vec<Article>) -> Digest {
        match self.policy {
            RankPolicy::GlobalTopN { limit } => Digest {
                sections: vec![DigestSection {
                    heading: None,
                    articles: top_n(articles, limit),
                }],
            },
            RankPolicy::PerCategory { max_per_category } => Digest {
                sections: self
                    .allocate(articles, max_per_category)
                    .into_iter()
                    .map(|(category, articles)| DigestSection {
                        heading: Some(category),
                        articles,
                    })
                    .collect(),
            },
        }
    }

    /// Distribute articles into per-category buckets, highest score first.
    ///
    /// An article is offered only to its best category. It is dropped when
    /// that bucket is full or its title was already placed.
    pub fn allocate(
        &self,
        articles: Vec<Article>,
        max_per_category: usize,
    ) -> IndexMap<String, Vec<Article>> {
        let mut buckets: IndexMap<String, Vec<Article>> = self
            .lexicon
            .categories()
            .iter()
            .map(|c| (c.clone(), Vec::new()))
            .collect();
        let mut placed_titles: HashSet<String> = HashSet::new();

        for article in sort_by_score(articles) {
            let Some(best) = self.best_category(&article).map(str::to_string) else {
                continue;
            };

            let title_key = article.title_key();
            if placed_titles.contains(&title_key) {
                continue;
            }

            match buckets.get_mut(&best) {
                Some(bucket) if bucket.len() < max_per_category => {
                    placed_titles.insert(title_key);
                    bucket.push(article);
                }
                Some(_) => debug!("Category '{}' full, dropping '{}'", best, article.title),
                None => debug!("Unknown category '{}' for '{}'", best, article.title),
            }
        }

        buckets
    }

    /// Category whose hard keywords weigh most among the article's tokens.
    ///
    /// Tokens are the whitespace-separated words of the lower-cased title and
    /// description and must equal a keyword exactly, unlike scoring which
    /// matches substrings. Repeated tokens count each time.
    pub fn best_category<'b>(&self, article: &'b Article) -> Option<&'b str> {
        let tokens = article.tokens();

        let mut candidates: Vec<&'b str> = article.categories.iter().map(String::as_str).collect();
        match self.tie_break {
            TieBreak::LexiconOrder => {
                let order = self.lexicon.categories();
                candidates.sort_by_key(|c| order.iter().position(|o| o.as_str() == *c).unwrap_or(usize::MAX));
            }
            TieBreak::Lexicographic => candidates.sort_unstable(),
        }

        let mut best: Option<(&'b str, u32)> = None;
        for category in candidates {
            let weight: u32 = tokens
                .iter()
                .map(|t| self.lexicon.hard_weight(category, t))
                .sum();
            if best.is_none_or(|(_, w)| weight > w) {
                best = Some((category, weight));
            }
        }

        best.map(|(category, _)| category)
    }
}

/// Stable sort by descending score; equal scores keep their input order
pub fn sort_by_score(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| b.score.cmp(&a.score));
    articles
}

/// The `limit` highest-scoring articles
pub fn top_n(articles: Vec<Article>, limit: usize) -> Vec<Article> {
    let mut ranked = sort_by_score(articles);
    ranked.truncate(limit);
    ranked
}
