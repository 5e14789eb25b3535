//! Relevance scoring for a single (entry, query) pair.
//!
//! The score is a sum of coarse signals (exact substring hits, fuzzy title
//! and keyword similarity, per-word partial hits) scaled once by the
//! entry's static priority.

use crate::{entry::SearchEntry, similarity::similarity};

/// Weights and thresholds for each relevance signal.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceWeights {
    /// Query is a substring of the title.
    pub title_exact: f64,
    /// Query is a substring of any keyword.
    pub keyword_exact: f64,
    /// Query is a substring of the description.
    pub description_exact: f64,
    /// Query is a substring of the content body.
    pub content_exact: f64,
    /// Multiplier for title similarity above the fuzzy threshold.
    pub title_fuzzy: f64,
    /// Multiplier for the best keyword similarity above the threshold.
    pub keyword_fuzzy: f64,
    /// Similarity must be strictly greater than this to count.
    pub fuzzy_threshold: f64,
    /// Per query word found in the title.
    pub word_in_title: f64,
    /// Per query word found in any keyword.
    pub word_in_keyword: f64,
    /// Per query word found in the description.
    pub word_in_description: f64,
    /// Query words must have more than this many chars to be scored.
    pub min_word_chars: usize,
    /// Priority that leaves the total unchanged.
    pub neutral_priority: f64,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            title_exact: 100.0,
            keyword_exact: 80.0,
            description_exact: 60.0,
            content_exact: 40.0,
            title_fuzzy: 50.0,
            keyword_fuzzy: 30.0,
            fuzzy_threshold: 0.5,
            word_in_title: 20.0,
            word_in_keyword: 15.0,
            word_in_description: 10.0,
            min_word_chars: 2,
            neutral_priority: 5.0,
        }
    }
}

/// An entry paired with its relevance for the current query.
#[derive(Debug, Clone, Copy)]
pub struct ScoredEntry<'a> {
    pub entry: &'a SearchEntry,
    pub score: f64,
}

/// Score `entry` against `query` with the default weights.
///
/// The query is assumed to be non-trivial; length checks belong to the
/// caller.
pub fn relevance(entry: &SearchEntry, query: &str) -> f64 {
    RelevanceWeights::default().score(entry, query)
}

impl RelevanceWeights {
    pub fn score(&self, entry: &SearchEntry, query: &str) -> f64 {
        let query = query.to_lowercase();
        let title = entry.title.to_lowercase();
        let description = entry.description.to_lowercase();
        let keywords: Vec<String> =
            entry.keywords.iter().map(|k| k.to_lowercase()).collect();

        let mut total = 0.0;

        if title.contains(&query) {
            total += self.title_exact;
        }
        if keywords.iter().any(|k| k.contains(&query)) {
            total += self.keyword_exact;
        }
        if description.contains(&query) {
            total += self.description_exact;
        }
        if entry.content.to_lowercase().contains(&query) {
            total += self.content_exact;
        }

        let title_similarity = similarity(&title, &query);
        if title_similarity > self.fuzzy_threshold {
            total += title_similarity * self.title_fuzzy;
        }

        let keyword_similarity = keywords
            .iter()
            .map(|k| similarity(k, &query))
            .fold(0.0, f64::max);
        if keyword_similarity > self.fuzzy_threshold {
            total += keyword_similarity * self.keyword_fuzzy;
        }

        for word in query
            .split_whitespace()
            .filter(|w| w.chars().count() > self.min_word_chars)
        {
            if title.contains(word) {
                total += self.word_in_title;
            }
            if keywords.iter().any(|k| k.contains(word)) {
                total += self.word_in_keyword;
            }
            if description.contains(word) {
                total += self.word_in_description;
            }
        }

        total * (f64::from(entry.priority) / self.neutral_priority)
    }
}
