use std::{
    collections::{BTreeSet, HashSet},
    path::Path,
};

use tracing::info;

use crate::{
    entry::{Category, SearchEntry},
    error::{Error, Result},
};

/// Catalog shipped with the binary, used when no catalog file is configured.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// The immutable set of searchable entries.
///
/// Entries keep the order they were loaded in; that order breaks ties when
/// ranking.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<SearchEntry>,
}

impl Catalog {
    /// Validate and wrap a list of entries.
    ///
    /// Fails on duplicate ids or a priority outside 1..=10.
    pub fn new(entries: Vec<SearchEntry>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !(1..=10).contains(&entry.priority) {
                return Err(Error::InvalidPriority {
                    id: entry.id.clone(),
                    priority: entry.priority,
                });
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(Error::DuplicateId(entry.id.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// Parse a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<SearchEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            entries = catalog.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// All entries, or only those in `category` when given.
    pub fn entries(
        &self,
        category: Option<Category>,
    ) -> impl Iterator<Item = &SearchEntry> + '_ {
        self.entries
            .iter()
            .filter(move |e| category.is_none_or(|c| e.category == c))
    }

    /// The distinct categories that occur in the catalog.
    pub fn categories(&self) -> BTreeSet<Category> {
        self.entries.iter().map(|e| e.category).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
