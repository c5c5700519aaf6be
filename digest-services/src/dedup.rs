//! Removal of repeated articles

use std::collections::HashSet;

use tracing::debug;

use digest_core::Article;

/// Drop articles whose title or link was already seen.
///
/// Titles and links are compared trimmed and lower-cased; a match on either
/// one is enough. An empty link never matches, so link-less articles are
/// compared by title alone. Encounter order is kept and the first occurrence
/// wins.
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    let mut seen_titles = HashSet::new();
    let mut seen_links = HashSet::new();
    let mut unique = Vec::with_capacity(articles.len());

    for article in articles {
        let title_key = article.title_key();
        let link_key = article.link_key();

        let link_seen = !link_key.is_empty() && seen_links.contains(&link_key);
        if seen_titles.contains(&title_key) || link_seen {
            debug!("Dropping duplicate '{}'", article.title);
            continue;
        }

        seen_titles.insert(title_key);
        if !link_key.is_empty() {
            seen_links.insert(link_key);
        }
        unique.push(article);
    }

    unique
}
