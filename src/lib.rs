//! sitefind - an in-memory fuzzy search engine for site content catalogs.
//!
//! A [`Catalog`] of entries is loaded once and ranked against free-text
//! queries by a [`SearchService`], which offers a cheap priority-ordered
//! suggestion tier and a thorough relevance-ranked search tier. A
//! [`QuerySession`] sits in front of the service for interactive callers,
//! debouncing keystrokes and tracking the selected category.
//!
//! # Quick start
//!
//! ```
//! use sitefind::{Catalog, Category, SearchOptions, SearchService};
//!
//! let service = SearchService::new(Catalog::builtin().unwrap());
//!
//! let options = SearchOptions {
//!     category: Some(Category::Docs),
//!     ..SearchOptions::default()
//! };
//! for entry in service.search("api", &options) {
//!     println!("{} -> {}", entry.title, entry.url);
//! }
//!
//! let suggestions = service.suggestions("pricing", 5);
//! assert_eq!(suggestions[0].id, "pricing-plans");
//! ```

pub mod catalog;
pub mod cli;
pub mod data_dir;
pub mod entry;
pub mod error;
pub mod mcp;
pub mod ranking;
pub mod search;
pub mod session;
pub mod settings;
pub mod similarity;

pub use catalog::Catalog;
pub use data_dir::DataDir;
pub use entry::{Category, SearchEntry};
pub use error::{Error, Result};
pub use ranking::{RelevanceWeights, ScoredEntry, relevance};
pub use search::{SearchOptions, SearchService, Searcher};
pub use session::{Phase, QuerySession, SessionOptions};
pub use settings::Settings;
pub use similarity::similarity;
