use std::sync::{Arc, Mutex, MutexGuard};

use consts::limits::{FILTER_DEBOUNCE, LEADERBOARD_PAGE_LIMIT, REQUEST_TIMEOUT};
use log::{debug, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use utils::debounce::Debouncer;
use web_time::Duration;

use super::coordinator::{FetchCoordinator, FetchOutcome, FetchStatus};
use super::filter::{FilterState, TimeWindow};
use super::pagination::PageState;
use super::provider::{LeaderboardError, RankingProvider, RankingQuery};
use super::types::{Epoch, RankedEntry};

#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardConfig {
    /// Page size, fixed for the controller's lifetime
    pub limit: u32,
    pub debounce: Duration,
    pub request_timeout: Duration,
    /// User whose row gets flagged in the view
    pub highlight_user: Option<i64>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            limit: LEADERBOARD_PAGE_LIMIT,
            debounce: FILTER_DEBOUNCE,
            request_timeout: REQUEST_TIMEOUT,
            highlight_user: None,
        }
    }
}

/// Everything a front end needs to draw the leaderboard.
#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardView {
    /// Filter as typed, may be ahead of `committed_filter` while debouncing
    pub filter: FilterState,
    pub committed_filter: FilterState,
    pub commit_pending: bool,
    pub epoch: Epoch,
    pub entries: Vec<RankedEntry>,
    pub page: PageState,
    pub status: FetchStatus,
    pub last_error: Option<LeaderboardError>,
    /// Bumps every time a response lands in this view
    pub responses_applied: u64,
    pub highlight_user: Option<i64>,
}

impl LeaderboardView {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Fetching { .. })
    }

    /// Whether a "Load More" action would issue a request
    pub fn can_load_more(&self) -> bool {
        self.page.has_more && !self.is_loading()
    }

    pub fn is_highlighted(&self, entry: &RankedEntry) -> bool {
        self.highlight_user == Some(entry.user_id)
    }
}

struct ControllerState {
    input: FilterState,
    commit_pending: bool,
    coordinator: FetchCoordinator,
}

impl ControllerState {
    fn view(&self, highlight_user: Option<i64>) -> LeaderboardView {
        let coordinator = &self.coordinator;
        LeaderboardView {
            filter: self.input.clone(),
            committed_filter: coordinator.filter().clone(),
            commit_pending: self.commit_pending,
            epoch: coordinator.epoch(),
            entries: coordinator.entries().to_vec(),
            page: coordinator.page(),
            status: coordinator.status(),
            last_error: coordinator.last_error().cloned(),
            responses_applied: coordinator.applied(),
            highlight_user,
        }
    }
}

struct Inner<P> {
    provider: P,
    config: LeaderboardConfig,
    state: Mutex<ControllerState>,
    debouncer: Debouncer,
    view_tx: watch::Sender<LeaderboardView>,
}

type FetchHandle = JoinHandle<Result<FetchOutcome, LeaderboardError>>;

impl<P: RankingProvider> Inner<P> {
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn view(&self) -> LeaderboardView {
        self.lock_state().view(self.config.highlight_user)
    }

    // Sent under the state lock so concurrent publishers can't reorder views
    fn publish(&self) {
        let state = self.lock_state();
        self.view_tx.send_replace(state.view(self.config.highlight_user));
    }

    /// Commit the typed filter as a new epoch and fetch its first page.
    fn start_epoch(self: &Arc<Self>) -> FetchHandle {
        let query = {
            let mut state = self.lock_state();
            state.commit_pending = false;
            let filter = state.input.clone();
            state.coordinator.begin_epoch(filter)
        };
        self.dispatch(query)
    }

    fn dispatch(self: &Arc<Self>, query: RankingQuery) -> FetchHandle {
        self.publish();
        debug!(
            "Fetching leaderboard: epoch {}, offset {}, limit {}, {:?}",
            query.page.epoch, query.page.offset, query.page.limit, query.page.mode
        );

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let result = inner.provider.fetch_page(&query).await;
            let outcome = inner.lock_state().coordinator.settle(&query, result);
            inner.publish();
            outcome
        })
    }
}

/// Debounced, paginated leaderboard fetching for one screen.
///
/// Filter setters echo immediately and commit after the debounce interval;
/// each commit starts a new epoch so late responses for an older filter are
/// dropped. Fetches run as tokio tasks, so setters must be called from within
/// a runtime. Dropping the controller cancels a pending commit.
pub struct LeaderboardController<P: RankingProvider> {
    inner: Arc<Inner<P>>,
}

impl<P: RankingProvider> LeaderboardController<P> {
    pub fn new(provider: P, config: LeaderboardConfig) -> Self {
        let state = ControllerState {
            input: FilterState::default(),
            commit_pending: false,
            coordinator: FetchCoordinator::new(config.limit),
        };
        let (view_tx, _) = watch::channel(state.view(config.highlight_user));

        Self {
            inner: Arc::new(Inner {
                provider,
                debouncer: Debouncer::new(config.debounce),
                config,
                state: Mutex::new(state),
                view_tx,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LeaderboardView> {
        self.inner.view_tx.subscribe()
    }

    pub fn snapshot(&self) -> LeaderboardView {
        self.inner.view()
    }

    pub fn has_pending_commit(&self) -> bool {
        self.inner.lock_state().commit_pending
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.update_input(move |filter| filter.search_term = term);
    }

    pub fn set_time_window(&self, window: TimeWindow) {
        self.update_input(move |filter| filter.time_window = window);
    }

    /// Ask for fresh rankings with the current filter, debounced like input.
    pub fn recalculate(&self) {
        self.update_input(|_| {});
    }

    /// Start a new epoch right away and load its first page.
    ///
    /// Supersedes any pending debounced commit.
    pub async fn reset(&self) -> Result<FetchOutcome, LeaderboardError> {
        if self.inner.debouncer.cancel() {
            debug!("Pending filter commit superseded by reset");
        }
        join_fetch(self.inner.start_epoch()).await
    }

    /// Load the next page of the current epoch.
    ///
    /// Returns [`FetchOutcome::Skipped`] without touching the network when the
    /// epoch is exhausted or a page is already loading.
    pub async fn next_page(&self) -> Result<FetchOutcome, LeaderboardError> {
        let query = self.inner.lock_state().coordinator.begin_next_page();
        let Some(query) = query else {
            debug!("Next page skipped: nothing more to load or fetch in flight");
            return Ok(FetchOutcome::Skipped);
        };
        join_fetch(self.inner.dispatch(query)).await
    }

    fn update_input(&self, edit: impl FnOnce(&mut FilterState)) {
        {
            let mut state = self.inner.lock_state();
            edit(&mut state.input);
            state.commit_pending = true;
        }
        self.schedule_commit();
        self.inner.publish();
    }

    fn schedule_commit(&self) {
        let inner = Arc::downgrade(&self.inner);
        self.inner.debouncer.schedule(move || {
            if let Some(inner) = inner.upgrade() {
                debug!("Filter input settled, committing");
                // Result lands in the published view
                let _ = inner.start_epoch();
            }
        });
    }
}

impl<P: RankingProvider> Drop for LeaderboardController<P> {
    fn drop(&mut self) {
        self.inner.debouncer.cancel();
    }
}

async fn join_fetch(handle: FetchHandle) -> Result<FetchOutcome, LeaderboardError> {
    handle.await.map_err(|e| {
        warn!("Leaderboard fetch task failed: {e}");
        LeaderboardError::Task(e.to_string())
    })?
}
