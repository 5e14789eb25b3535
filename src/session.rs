//! Incremental query session: debounced lookups driven by a caller.
//!
//! Every query change restarts a single delayed lookup. Category changes
//! and explicit submits run the lookup right away. A generation counter
//! makes sure a lookup started for an older query never publishes over a
//! newer one.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, trace};

use crate::{
    entry::{Category, SearchEntry},
    error::{Error, Result},
    search::{DEFAULT_SUGGESTION_LIMIT, SearchOptions, Searcher, is_searchable},
    settings::Settings,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Observable lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No query yet, or the session was cleared.
    Idle,
    /// The query changed and a lookup is scheduled.
    Debouncing,
    /// The latest lookup has finished and its lists are published.
    Settled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub debounce: Duration,
    /// Limits for the search tier; the category comes from the session.
    pub search: SearchOptions,
    pub suggestion_limit: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            search: SearchOptions::default(),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl From<&Settings> for SessionOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            debounce: settings.debounce(),
            search: settings.search_options(),
            suggestion_limit: settings.suggestion_limit,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    query: String,
    category: Option<Category>,
    suggestions: Vec<SearchEntry>,
    results: Vec<SearchEntry>,
    searching: bool,
    phase: Phase,
    generation: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            query: String::new(),
            category: None,
            suggestions: Vec::new(),
            results: Vec::new(),
            searching: false,
            phase: Phase::Idle,
            generation: 0,
        }
    }

    /// Invalidate any lookup in flight and return the new generation.
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

struct Shared {
    searcher: Arc<dyn Searcher>,
    options: SessionOptions,
    state: Mutex<SessionState>,
    updates: watch::Sender<u64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.updates.send_modify(|revision| *revision += 1);
    }

    /// Run both tiers for the current query and publish the outcome,
    /// unless a newer generation has started in the meantime.
    fn run_lookup(&self, generation: u64) {
        let (query, category) = {
            let state = self.lock();
            if state.generation != generation {
                trace!(generation, "dropping stale lookup");
                return;
            }
            (state.query.clone(), state.category)
        };

        let (suggestions, results) = if is_searchable(&query) {
            let suggestions = self
                .searcher
                .suggestions(&query, self.options.suggestion_limit);
            let options = SearchOptions {
                category,
                ..self.options.search.clone()
            };
            let results = self.searcher.search(&query, &options);
            (suggestions, results)
        } else {
            (Vec::new(), Vec::new())
        };

        {
            let mut state = self.lock();
            if state.generation != generation {
                trace!(generation, "lookup superseded before publishing");
                return;
            }
            debug!(
                query = %query,
                ?category,
                suggestions = suggestions.len(),
                results = results.len(),
                "lookup settled"
            );
            state.suggestions = suggestions;
            state.results = results;
            state.searching = false;
            state.phase = if query.trim().is_empty() {
                Phase::Idle
            } else {
                Phase::Settled
            };
        }
        self.notify();
    }
}

/// Owns the query state of one consumer and drives a [`Searcher`].
///
/// Must be created inside a Tokio runtime; the debounce timer runs as a
/// task on that runtime. Dropping the session cancels any pending lookup.
pub struct QuerySession {
    shared: Arc<Shared>,
    pending: Option<JoinHandle<()>>,
    runtime: Handle,
}

impl QuerySession {
    pub fn new(
        searcher: Arc<dyn Searcher>,
        options: SessionOptions,
    ) -> Result<Self> {
        let runtime =
            Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;
        Ok(Self::with_handle(searcher, options, runtime))
    }

    pub fn with_handle(
        searcher: Arc<dyn Searcher>,
        options: SessionOptions,
        runtime: Handle,
    ) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                searcher,
                options,
                state: Mutex::new(SessionState::new()),
                updates,
            }),
            pending: None,
            runtime,
        }
    }

    /// Replace the query text and restart the debounce timer.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let generation = {
            let mut state = self.shared.lock();
            state.query = text.into();
            state.searching = true;
            state.phase = Phase::Debouncing;
            state.bump()
        };
        self.cancel_pending();

        let shared = Arc::clone(&self.shared);
        let delay = shared.options.debounce;
        trace!(generation, ?delay, "scheduling lookup");
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            shared.run_lookup(generation);
        }));
    }

    /// Change the category filter and look up again right away.
    pub fn set_category(&mut self, category: Option<Category>) {
        self.shared.lock().category = category;
        self.run_now();
    }

    /// Skip the debounce delay and look up the current query now.
    pub fn search_now(&mut self) {
        self.run_now();
    }

    /// Reset the query, category and both lists.
    pub fn clear(&mut self) {
        self.cancel_pending();
        {
            let mut state = self.shared.lock();
            state.bump();
            state.query.clear();
            state.category = None;
            state.suggestions.clear();
            state.results.clear();
            state.searching = false;
            state.phase = Phase::Idle;
        }
        self.shared.notify();
    }

    pub fn query(&self) -> String {
        self.shared.lock().query.clone()
    }

    pub fn category(&self) -> Option<Category> {
        self.shared.lock().category
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase
    }

    pub fn current_suggestions(&self) -> Vec<SearchEntry> {
        self.shared.lock().suggestions.clone()
    }

    pub fn current_results(&self) -> Vec<SearchEntry> {
        self.shared.lock().results.clone()
    }

    /// True from a query change until its lookup has published.
    pub fn is_searching(&self) -> bool {
        self.shared.lock().searching
    }

    pub fn available_categories(&self) -> BTreeSet<Category> {
        self.shared.searcher.categories()
    }

    /// A revision counter that ticks whenever the published lists change.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.shared.updates.subscribe()
    }

    fn run_now(&mut self) {
        self.cancel_pending();
        let generation = {
            let mut state = self.shared.lock();
            state.searching = true;
            state.bump()
        };
        self.shared.run_lookup(generation);
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for QuerySession {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Barrier,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{catalog::Catalog, search::SearchService};

    /// Wraps the real service and records every call.
    struct Recording {
        inner: SearchService,
        searches: Mutex<Vec<(String, Option<Category>)>>,
        suggestions: AtomicUsize,
    }

    impl Recording {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: SearchService::new(Catalog::builtin().unwrap()),
                searches: Mutex::new(Vec::new()),
                suggestions: AtomicUsize::new(0),
            })
        }

        fn searches(&self) -> Vec<(String, Option<Category>)> {
            self.searches.lock().unwrap().clone()
        }

        fn search_count(&self) -> usize {
            self.searches.lock().unwrap().len()
        }
    }

    impl Searcher for Recording {
        fn search(
            &self,
            query: &str,
            options: &SearchOptions,
        ) -> Vec<SearchEntry> {
            self.searches
                .lock()
                .unwrap()
                .push((query.to_string(), options.category));
            self.inner.search(query, options)
        }

        fn suggestions(
            &self,
            query: &str,
            max_results: usize,
        ) -> Vec<SearchEntry> {
            self.suggestions.fetch_add(1, Ordering::SeqCst);
            self.inner.suggestions(query, max_results)
        }

        fn categories(&self) -> BTreeSet<Category> {
            self.inner.categories()
        }
    }

    fn session(searcher: &Arc<Recording>) -> QuerySession {
        QuerySession::new(searcher.clone(), SessionOptions::default()).unwrap()
    }

    async fn settle() {
        tokio::time::sleep(DEFAULT_DEBOUNCE + Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_runs_one_lookup() {
        let searcher = Recording::new();
        let mut session = session(&searcher);

        session.set_query("p");
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.set_query("pr");
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.set_query("pri");
        settle().await;

        assert_eq!(searcher.searches(), [("pri".to_string(), None)]);
        assert_eq!(searcher.suggestions.load(Ordering::SeqCst), 1);
        assert!(!session.current_results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_waits_for_the_full_debounce() {
        let searcher = Recording::new();
        let mut session = session(&searcher);

        session.set_query("pricing");
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(searcher.search_count(), 0);
        assert_eq!(session.phase(), Phase::Debouncing);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(searcher.search_count(), 1);
        assert_eq!(session.phase(), Phase::Settled);
    }

    #[tokio::test(start_paused = true)]
    async fn searching_flag_follows_lookup() {
        let searcher = Recording::new();
        let mut session = session(&searcher);
        assert!(!session.is_searching());
        assert_eq!(session.phase(), Phase::Idle);

        session.set_query("pricing");
        assert!(session.is_searching());
        assert!(session.current_results().is_empty());

        settle().await;
        assert!(!session.is_searching());
        let results = session.current_results();
        assert_eq!(results[0].id, "pricing-plans");
        assert_eq!(session.current_suggestions()[0].id, "pricing-plans");
    }

    #[tokio::test(start_paused = true)]
    async fn query_shrinking_below_minimum_clears_lists() {
        let searcher = Recording::new();
        let mut session = session(&searcher);

        session.set_query("pricing");
        settle().await;
        assert!(!session.current_results().is_empty());

        session.set_query("p");
        settle().await;
        assert!(session.current_results().is_empty());
        assert!(session.current_suggestions().is_empty());
        assert!(!session.is_searching());
        assert_eq!(searcher.search_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn search_now_skips_the_delay() {
        let searcher = Recording::new();
        let mut session = session(&searcher);

        session.set_query("api");
        session.search_now();
        assert!(!session.is_searching());
        assert!(!session.current_results().is_empty());
        assert_eq!(session.phase(), Phase::Settled);

        // The cancelled timer must not fire a second lookup.
        settle().await;
        assert_eq!(searcher.search_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn category_change_reruns_immediately() {
        let searcher = Recording::new();
        let mut session = session(&searcher);

        session.set_query("api");
        settle().await;
        assert!(
            session
                .current_results()
                .iter()
                .any(|e| e.category == Category::Blog)
        );

        session.set_category(Some(Category::Docs));
        assert_eq!(searcher.search_count(), 2);
        let results = session.current_results();
        assert!(!results.is_empty());
        assert!(results.iter().all(|e| e.category == Category::Docs));
        assert_eq!(
            searcher.searches().last(),
            Some(&("api".to_string(), Some(Category::Docs)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn category_persists_across_query_changes() {
        let searcher = Recording::new();
        let mut session = session(&searcher);

        session.set_category(Some(Category::Docs));
        session.set_query("api");
        settle().await;

        assert!(
            session
                .current_results()
                .iter()
                .all(|e| e.category == Category::Docs)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn category_with_no_matches_yields_nothing() {
        let searcher = Recording::new();
        let mut session = session(&searcher);
        session.set_query("pricing");
        settle().await;

        session.set_category(Some(Category::Legal));
        assert!(session.current_results().is_empty());
        assert!(!session.available_categories().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn category_change_with_short_query_does_not_search() {
        let searcher = Recording::new();
        let mut session = session(&searcher);

        session.set_category(Some(Category::Docs));
        assert_eq!(searcher.search_count(), 0);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.is_searching());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_resets_everything() {
        let searcher = Recording::new();
        let mut session = session(&searcher);

        session.set_category(Some(Category::Docs));
        session.set_query("api");
        settle().await;
        session.set_query("api ref");
        session.clear();

        assert_eq!(session.query(), "");
        assert_eq!(session.category(), None);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.is_searching());
        assert!(session.current_results().is_empty());
        assert!(session.current_suggestions().is_empty());

        // The pending timer for "api ref" was cancelled.
        settle().await;
        assert_eq!(searcher.search_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn updates_tick_when_results_publish() {
        let searcher = Recording::new();
        let mut session = session(&searcher);
        let mut updates = session.updates();

        session.set_query("support");
        updates.changed().await.unwrap();
        assert!(!session.current_results().is_empty());
        assert_eq!(*updates.borrow_and_update(), 1);

        session.clear();
        assert!(updates.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn custom_debounce_is_honoured() {
        let searcher = Recording::new();
        let options = SessionOptions {
            debounce: Duration::from_millis(50),
            ..SessionOptions::default()
        };
        let mut session =
            QuerySession::new(searcher.clone(), options).unwrap();

        session.set_query("audit");
        tokio::time::sleep(Duration::from_millis(51)).await;
        assert_eq!(searcher.search_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn session_options_limit_result_sizes() {
        let searcher = Recording::new();
        let options = SessionOptions {
            search: SearchOptions {
                max_results: 1,
                ..SearchOptions::default()
            },
            suggestion_limit: 1,
            ..SessionOptions::default()
        };
        let mut session =
            QuerySession::new(searcher.clone(), options).unwrap();

        session.set_query("team");
        session.search_now();
        assert_eq!(session.current_results().len(), 1);
        assert_eq!(session.current_suggestions().len(), 1);
    }

    /// Holds every "pricing" search until the test releases it.
    struct Gated {
        inner: SearchService,
        gate: Barrier,
        finished: AtomicUsize,
    }

    impl Searcher for Gated {
        fn search(
            &self,
            query: &str,
            options: &SearchOptions,
        ) -> Vec<SearchEntry> {
            if query == "pricing" {
                // Once to signal entry, once to wait for release.
                self.gate.wait();
                self.gate.wait();
            }
            let results = self.inner.search(query, options);
            self.finished.fetch_add(1, Ordering::SeqCst);
            results
        }

        fn suggestions(
            &self,
            query: &str,
            max_results: usize,
        ) -> Vec<SearchEntry> {
            self.inner.suggestions(query, max_results)
        }

        fn categories(&self) -> BTreeSet<Category> {
            self.inner.categories()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn lookup_superseded_mid_search_never_publishes() {
        let searcher = Arc::new(Gated {
            inner: SearchService::new(Catalog::builtin().unwrap()),
            gate: Barrier::new(2),
            finished: AtomicUsize::new(0),
        });
        let options = SessionOptions {
            debounce: Duration::from_millis(10),
            ..SessionOptions::default()
        };
        let mut session =
            QuerySession::new(searcher.clone(), options.clone()).unwrap();

        session.set_query("pricing");
        // Wait until the delayed lookup is inside the searcher.
        searcher.gate.wait();

        session.set_query("api");
        session.search_now();
        let expected = searcher.inner.search("api", &options.search);
        assert_eq!(session.current_results(), expected);

        searcher.gate.wait();
        while searcher.finished.load(Ordering::SeqCst) < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(session.query(), "api");
        assert_eq!(session.phase(), Phase::Settled);
        assert!(!session.is_searching());
        assert_eq!(session.current_results(), expected);
    }

    #[test]
    fn new_requires_a_runtime() {
        let searcher = Recording::new();
        let err = QuerySession::new(searcher, SessionOptions::default());
        assert!(matches!(err, Err(Error::Runtime(_))));
    }

    #[test]
    fn options_from_settings() {
        let settings = Settings {
            debounce_ms: 120,
            suggestion_limit: 3,
            ..Settings::default()
        };
        let options = SessionOptions::from(&settings);
        assert_eq!(options.debounce, Duration::from_millis(120));
        assert_eq!(options.suggestion_limit, 3);
        assert_eq!(options.search, SearchOptions::default());
    }
}
