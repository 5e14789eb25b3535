//! Catalog lookups in two tiers.
//!
//! [`SearchService::suggestions`] is the cheap tier: plain substring hits
//! ordered by entry priority. [`SearchService::search`] is the thorough
//! tier: every candidate is scored for relevance, weak matches are cut and
//! the rest are sorted by score.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::{
    catalog::Catalog,
    entry::{Category, SearchEntry},
    error::Result,
    ranking::{RelevanceWeights, ScoredEntry},
};

/// Queries shorter than this (after trimming) are never searched.
pub const MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const DEFAULT_MIN_SCORE: f64 = 10.0;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Options for the thorough search tier.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub max_results: usize,
    pub min_score: f64,
    pub category: Option<Category>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_score: DEFAULT_MIN_SCORE,
            category: None,
        }
    }
}

/// The two lookup tiers a query session drives.
pub trait Searcher: Send + Sync {
    /// Relevance-ranked lookup with a score cutoff.
    fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchEntry>;

    /// Substring-only lookup ordered by priority.
    fn suggestions(&self, query: &str, max_results: usize) -> Vec<SearchEntry>;

    fn categories(&self) -> BTreeSet<Category>;
}

/// Whether `query` is long enough to be worth searching.
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Ranks a catalog against free-text queries.
#[derive(Debug, Clone, Default)]
pub struct SearchService {
    catalog: Catalog,
    weights: RelevanceWeights,
}

impl SearchService {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_weights(catalog, RelevanceWeights::default())
    }

    pub fn with_weights(catalog: Catalog, weights: RelevanceWeights) -> Self {
        Self { catalog, weights }
    }

    /// Replace the catalog. Must happen before the service is shared.
    pub fn load(&mut self, entries: Vec<SearchEntry>) -> Result<()> {
        self.catalog = Catalog::new(entries)?;
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run the search pipeline and keep the scores.
    ///
    /// 1. Reject queries under two characters
    /// 2. Select candidates, filtered by category
    /// 3. Score every candidate
    /// 4. Drop scores below `min_score`
    /// 5. Sort by score, keeping catalog order on ties
    /// 6. Limit to `max_results`
    pub fn rank(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Vec<ScoredEntry<'_>> {
        if !is_searchable(query) {
            return Vec::new();
        }
        let query = query.trim();

        let mut candidates = 0usize;
        let mut scored: Vec<ScoredEntry<'_>> = self
            .catalog
            .entries(options.category)
            .inspect(|_| candidates += 1)
            .map(|entry| ScoredEntry {
                entry,
                score: self.weights.score(entry, query),
            })
            .filter(|s| s.score >= options.min_score)
            .collect();

        // Vec::sort_by is stable.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        let hits = scored.len();
        scored.truncate(options.max_results);

        debug!(
            query,
            category = ?options.category,
            candidates,
            hits,
            returned = scored.len(),
            "search"
        );

        scored
    }

    pub fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Vec<SearchEntry> {
        self.rank(query, options)
            .into_iter()
            .map(|s| s.entry.clone())
            .collect()
    }

    pub fn suggestions(
        &self,
        query: &str,
        max_results: usize,
    ) -> Vec<SearchEntry> {
        if !is_searchable(query) {
            return Vec::new();
        }
        let query = query.trim().to_lowercase();

        let mut matches: Vec<&SearchEntry> = self
            .catalog
            .entries(None)
            .filter(|e| {
                e.title.to_lowercase().contains(&query)
                    || e.keywords
                        .iter()
                        .any(|k| k.to_lowercase().contains(&query))
                    || e.description.to_lowercase().contains(&query)
            })
            .collect();

        matches.sort_by(|a, b| b.priority.cmp(&a.priority));
        matches.truncate(max_results);

        debug!(query = %query, returned = matches.len(), "suggestions");

        matches.into_iter().cloned().collect()
    }

    pub fn categories(&self) -> BTreeSet<Category> {
        self.catalog.categories()
    }
}

impl Searcher for SearchService {
    fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchEntry> {
        SearchService::search(self, query, options)
    }

    fn suggestions(&self, query: &str, max_results: usize) -> Vec<SearchEntry> {
        SearchService::suggestions(self, query, max_results)
    }

    fn categories(&self) -> BTreeSet<Category> {
        SearchService::categories(self)
    }
}

/// Serializable view of a result, shared by JSON output and MCP responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub url: String,
    pub page: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl From<&SearchEntry> for ResultItem {
    fn from(entry: &SearchEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            category: entry.category,
            url: entry.url.clone(),
            page: entry.page.clone(),
            description: entry.description.clone(),
            score: None,
        }
    }
}

impl From<&ScoredEntry<'_>> for ResultItem {
    fn from(scored: &ScoredEntry<'_>) -> Self {
        Self {
            score: Some(scored.score),
            ..Self::from(scored.entry)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub result_count: usize,
    pub results: Vec<ResultItem>,
}

impl SearchResponse {
    pub fn new(query: &str, results: Vec<ResultItem>) -> Self {
        Self {
            query: query.to_string(),
            result_count: results.len(),
            results,
        }
    }
}

/// Format results for human-readable terminal output.
pub fn format_human(results: &[ResultItem]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut lines = Vec::with_capacity(results.len() * 2 + 1);
    for (i, r) in results.iter().enumerate() {
        match r.score {
            Some(score) => lines.push(format!(
                "{:>3}. [{score:.1}] {} ({}) {}",
                i + 1,
                r.title,
                r.category,
                r.url
            )),
            None => lines.push(format!(
                "{:>3}. {} ({}) {}",
                i + 1,
                r.title,
                r.category,
                r.url
            )),
        }
        if !r.description.is_empty() {
            lines.push(format!("     {}", r.description));
        }
    }
    lines.push(format!("\n{} result(s)", results.len()));
    lines.join("\n")
}

/// Format results as a JSON document.
pub fn format_json(query: &str, results: Vec<ResultItem>) -> Result<String> {
    Ok(serde_json::to_string(&SearchResponse::new(query, results))?)
}
