//! Article browsing state machine
//!
//! [`BrowsingController`] ties the fetcher, the story cursor, and the user's
//! preferences together. It moves through [`BrowsingPhase`]s as fetches start
//! and finish, and applies a fetch result only while its request token is
//! still the newest one issued. Older results are dropped on arrival, so
//! rapid category or country changes never leave stale articles on screen.

use crate::cursor::{StoryCursor, SwipeGesture};
use crate::preferences::{PreferenceStore, Subscription};
use news_client::{Article, ArticleFetcher, ArticleQuery, ArticleSet, Category, Country};
use parking_lot::Mutex;
use std::sync::Arc;
use storage::Preferences;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

/// Message shown when a query has no headlines
pub const NO_ARTICLES_MESSAGE: &str = "No articles found for this category and country combination";

/// Why the controller is not showing articles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseFailure {
    /// The query succeeded but returned nothing; offer a reset to the default category
    NoArticles {
        /// User-facing message
        message: String,
    },
    /// Transport or parse failure; offer a retry
    Fetch {
        /// User-facing message
        message: String,
        /// Whether the failure looked transient
        retryable: bool,
    },
}

impl BrowseFailure {
    /// User-facing message
    pub fn message(&self) -> &str {
        match self {
            BrowseFailure::NoArticles { message } | BrowseFailure::Fetch { message, .. } => {
                message
            }
        }
    }

    /// Check if the view should offer "try again"
    pub fn offers_retry(&self) -> bool {
        matches!(self, BrowseFailure::Fetch { .. })
    }

    /// Check if the view should offer "back to general news"
    pub fn offers_reset(&self) -> bool {
        matches!(self, BrowseFailure::NoArticles { .. })
    }
}

/// Browsing lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BrowsingPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// Articles are available
    Ready,
    /// The latest fetch produced no articles
    Failed(BrowseFailure),
}

impl BrowsingPhase {
    /// Check if a fetch is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, BrowsingPhase::Loading)
    }

    /// Check if articles are available
    pub fn is_ready(&self) -> bool {
        matches!(self, BrowsingPhase::Ready)
    }

    /// The failure, if any
    pub fn failure(&self) -> Option<&BrowseFailure> {
        match self {
            BrowsingPhase::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// What happened to a fetch once it completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The result was applied to the controller state
    Applied,
    /// A newer request was issued first; the result was discarded
    Superseded,
}

/// Point-in-time copy of the controller state for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct BrowsingSnapshot {
    /// Lifecycle phase
    pub phase: BrowsingPhase,
    /// Selected category
    pub category: Category,
    /// Selected country
    pub country: Country,
    /// Articles of the last applied fetch
    pub articles: Vec<Article>,
    /// Cursor index, `None` when there are no articles
    pub index: Option<usize>,
    /// Categories offered for selection
    pub available_categories: Vec<Category>,
    /// Token of the newest request issued
    pub request_token: u64,
}

impl BrowsingSnapshot {
    /// Article under the cursor
    pub fn current_article(&self) -> Option<&Article> {
        self.index.and_then(|i| self.articles.get(i))
    }
}

#[derive(Debug)]
struct BrowsingState {
    phase: BrowsingPhase,
    category: Category,
    country: Country,
    articles: ArticleSet,
    cursor: StoryCursor,
    available: Vec<Category>,
    latest_token: u64,
}

impl BrowsingState {
    fn clear_articles(&mut self, query: ArticleQuery) {
        self.articles = ArticleSet::empty(query);
        self.cursor.replace(0);
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<BrowsingState>,
    phase_tx: watch::Sender<BrowsingPhase>,
}

/// A request stamped with its token, not yet awaited
#[derive(Debug)]
struct PendingRequest {
    token: u64,
    query: ArticleQuery,
}

/// Browsing state shared between the view and background tasks
///
/// Cloning is cheap; clones drive the same state. The state lock is never
/// held across an await.
///
/// # Examples
/// ```
/// use app_state::browsing::BrowsingController;
/// use news_client::{ArticleFetcher, SyntheticSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let controller = BrowsingController::new(ArticleFetcher::new(SyntheticSource::new()));
/// controller.start().await;
///
/// assert!(controller.phase().is_ready());
/// controller.next_story();
/// assert_eq!(controller.snapshot().index, Some(1));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BrowsingController {
    fetcher: ArticleFetcher,
    shared: Arc<Shared>,
}

impl BrowsingController {
    /// Create an idle controller on `general` news for the default country
    pub fn new(fetcher: ArticleFetcher) -> Self {
        Self::with_preferences(fetcher, &Preferences::default())
    }

    /// Create an idle controller using the country and categories from `prefs`
    pub fn with_preferences(fetcher: ArticleFetcher, prefs: &Preferences) -> Self {
        let available = preferred_categories(prefs);
        let category = if available.contains(&Category::General) {
            Category::General
        } else {
            available[0]
        };
        let country = country_or_default(&prefs.country);
        let query = ArticleQuery::new(category, country.clone());

        let (phase_tx, _) = watch::channel(BrowsingPhase::Idle);
        let state = BrowsingState {
            phase: BrowsingPhase::Idle,
            category,
            country,
            articles: ArticleSet::empty(query),
            cursor: StoryCursor::default(),
            available,
            latest_token: 0,
        };

        Self { fetcher, shared: Arc::new(Shared { state: Mutex::new(state), phase_tx }) }
    }

    // =========================================================================
    // Fetch-triggering operations
    // =========================================================================

    /// Fetch the current selection
    pub async fn start(&self) -> RequestOutcome {
        let pending = {
            let mut state = self.shared.state.lock();
            let (category, country) = (state.category, state.country.clone());
            self.begin(&mut state, category, country)
        };
        self.complete(pending).await
    }

    /// Switch category and fetch. Unknown names fall back to `general`.
    pub async fn select_category(&self, name: &str) -> RequestOutcome {
        let category = Category::parse(name).unwrap_or_else(|| {
            tracing::warn!(category = name, "Unknown category selected, using general");
            Category::General
        });

        let pending = {
            let mut state = self.shared.state.lock();
            let country = state.country.clone();
            self.begin(&mut state, category, country)
        };
        self.complete(pending).await
    }

    /// Switch country and fetch. Malformed codes fall back to the default country.
    pub async fn select_country(&self, code: &str) -> RequestOutcome {
        let country = country_or_default(code);

        let pending = {
            let mut state = self.shared.state.lock();
            let category = state.category;
            self.begin(&mut state, category, country)
        };
        self.complete(pending).await
    }

    /// Re-issue the current selection after a failure
    pub async fn retry(&self) -> RequestOutcome {
        self.start().await
    }

    /// Go back to `general` news, the affordance offered when a query is empty
    pub async fn reset_to_default_category(&self) -> RequestOutcome {
        self.select_category(Category::General.as_str()).await
    }

    /// Reconcile with new preferences.
    ///
    /// Fetches exactly once if the country changed or the selected category
    /// is no longer preferred (switching to the first available one).
    /// Returns `None` when nothing relevant changed.
    pub async fn apply_preferences(&self, prefs: &Preferences) -> Option<RequestOutcome> {
        let pending = self.begin_for_preferences(prefs)?;
        Some(self.complete(pending).await)
    }

    fn begin_for_preferences(&self, prefs: &Preferences) -> Option<PendingRequest> {
        let available = preferred_categories(prefs);
        let country = country_or_default(&prefs.country);

        let mut state = self.shared.state.lock();
        let country_changed = state.country != country;
        let category_removed = !available.contains(&state.category);
        let category = if category_removed { available[0] } else { state.category };
        state.available = available;

        if !country_changed && !category_removed {
            return None;
        }

        tracing::debug!(country_changed, category_removed, "Preferences changed selection");
        Some(self.begin(&mut state, category, country))
    }

    /// Stamp a new request and enter `Loading`. Caller holds the state lock.
    fn begin(
        &self,
        state: &mut BrowsingState,
        category: Category,
        country: Country,
    ) -> PendingRequest {
        state.latest_token += 1;
        state.category = category;
        state.country = country.clone();
        self.set_phase(state, BrowsingPhase::Loading);

        let query = ArticleQuery::new(category, country);
        tracing::debug!(token = state.latest_token, query = %query, "Fetch started");
        PendingRequest { token: state.latest_token, query }
    }

    /// Await the fetch and apply it if still current
    async fn complete(&self, pending: PendingRequest) -> RequestOutcome {
        let result = self.fetcher.fetch_query(pending.query.clone()).await;

        let mut state = self.shared.state.lock();
        if state.latest_token != pending.token {
            tracing::debug!(
                token = pending.token,
                latest = state.latest_token,
                query = %pending.query,
                "Discarding superseded fetch result"
            );
            return RequestOutcome::Superseded;
        }

        match result {
            Ok(set) if !set.is_empty() => {
                state.cursor.replace(set.len());
                state.articles = set;
                self.set_phase(&mut state, BrowsingPhase::Ready);
            }
            Ok(set) => {
                state.clear_articles(set.query().clone());
                let failure =
                    BrowseFailure::NoArticles { message: NO_ARTICLES_MESSAGE.to_string() };
                self.set_phase(&mut state, BrowsingPhase::Failed(failure));
            }
            Err(e) => {
                let failure = BrowseFailure::Fetch {
                    message: format!("Failed to fetch news articles: {}", e.source),
                    retryable: e.is_retryable(),
                };
                state.clear_articles(e.query);
                self.set_phase(&mut state, BrowsingPhase::Failed(failure));
            }
        }

        tracing::debug!(token = pending.token, phase = ?state.phase, "Fetch applied");
        RequestOutcome::Applied
    }

    fn set_phase(&self, state: &mut BrowsingState, phase: BrowsingPhase) {
        state.phase = phase.clone();
        self.shared.phase_tx.send_replace(phase);
    }

    // =========================================================================
    // Story navigation
    // =========================================================================

    /// Advance to the next story
    pub fn next_story(&self) -> Option<usize> {
        self.shared.state.lock().cursor.next()
    }

    /// Go back to the previous story
    pub fn prev_story(&self) -> Option<usize> {
        self.shared.state.lock().cursor.prev()
    }

    /// Jump to a story, clamped to the list
    pub fn goto_story(&self, index: usize) -> Option<usize> {
        self.shared.state.lock().cursor.goto(index)
    }

    /// Apply a swipe gesture
    pub fn swipe(&self, gesture: SwipeGesture) -> Option<usize> {
        self.shared.state.lock().cursor.swipe(gesture)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Article under the cursor
    pub fn current_article(&self) -> Option<Article> {
        let state = self.shared.state.lock();
        state.cursor.index().and_then(|i| state.articles.get(i)).cloned()
    }

    /// Current phase
    pub fn phase(&self) -> BrowsingPhase {
        self.shared.state.lock().phase.clone()
    }

    /// Selected category
    pub fn category(&self) -> Category {
        self.shared.state.lock().category
    }

    /// Selected country
    pub fn country(&self) -> Country {
        self.shared.state.lock().country.clone()
    }

    /// Categories offered for selection, `general` first
    pub fn available_categories(&self) -> Vec<Category> {
        self.shared.state.lock().available.clone()
    }

    /// Copy of the full state
    pub fn snapshot(&self) -> BrowsingSnapshot {
        let state = self.shared.state.lock();
        BrowsingSnapshot {
            phase: state.phase.clone(),
            category: state.category,
            country: state.country.clone(),
            articles: state.articles.articles().to_vec(),
            index: state.cursor.index(),
            available_categories: state.available.clone(),
            request_token: state.latest_token,
        }
    }

    /// Watch phase transitions
    pub fn subscribe_phase(&self) -> watch::Receiver<BrowsingPhase> {
        self.shared.phase_tx.subscribe()
    }
}

/// Parse the preferred category names, `general` first.
///
/// Falls back to `[general]` if none are recognized.
fn preferred_categories(prefs: &Preferences) -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::new();
    for name in &prefs.categories {
        match Category::parse(name) {
            Some(category) if !categories.contains(&category) => categories.push(category),
            Some(_) => {}
            None => tracing::debug!(category = %name, "Skipping unknown preferred category"),
        }
    }

    if let Some(pos) = categories.iter().position(|c| *c == Category::General) {
        let general = categories.remove(pos);
        categories.insert(0, general);
    }
    if categories.is_empty() {
        categories.push(Category::General);
    }
    categories
}

fn country_or_default(code: &str) -> Country {
    Country::parse(code).unwrap_or_else(|_| {
        tracing::warn!(country = code, "Malformed country, using default");
        Country::default()
    })
}

// =============================================================================
// Preference Following
// =============================================================================

/// Keeps a controller in step with a [`PreferenceStore`]
///
/// Dropping the handle (or calling [`stop`](Self::stop)) unsubscribes and
/// aborts any fetches it started.
#[derive(Debug)]
pub struct PreferenceFollower {
    subscription: Option<Subscription>,
    task: JoinHandle<()>,
}

impl PreferenceFollower {
    /// Stop following
    pub fn stop(self) {
        // Drop does the work
    }
}

impl Drop for PreferenceFollower {
    fn drop(&mut self) {
        self.subscription.take();
        self.task.abort();
    }
}

/// Apply every preference change to `controller`.
///
/// Changes are forwarded over a channel to a background task. Requests are
/// stamped in the order changes arrive and their fetches run concurrently,
/// so a newer change supersedes a slower older one.
///
/// Must be called within a Tokio runtime.
pub fn follow_preferences(
    controller: BrowsingController,
    store: &PreferenceStore,
) -> PreferenceFollower {
    let (tx, mut rx) = mpsc::unbounded_channel::<Preferences>();

    let subscription = store.subscribe(move |prefs| {
        // Receiver gone means the follower is shutting down
        let _ = tx.send(prefs.clone());
    });

    let task = tokio::spawn(async move {
        let mut fetches = JoinSet::new();
        while let Some(prefs) = rx.recv().await {
            while fetches.try_join_next().is_some() {}

            if let Some(pending) = controller.begin_for_preferences(&prefs) {
                let controller = controller.clone();
                fetches.spawn(async move {
                    controller.complete(pending).await;
                });
            }
        }
    });

    PreferenceFollower { subscription: Some(subscription), task }
}
