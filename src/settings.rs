use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    search::{
        DEFAULT_MAX_RESULTS,
        DEFAULT_MIN_SCORE,
        DEFAULT_SUGGESTION_LIMIT,
        SearchOptions,
    },
};

/// Tunables read from `settings.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Quiet period after the last keystroke before a lookup runs.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_min_score")]
    pub min_score: f64,

    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

fn default_debounce_ms() -> u64 {
    300
}
fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
}
fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_results: default_max_results(),
            min_score: default_min_score(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file
    /// does not exist. A file that exists but cannot be parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("invalid settings {}: {e}", path.display()))
        })?;
        Ok(settings)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_results: self.max_results,
            min_score: self.min_score,
            category: None,
        }
    }
}
