use log::{debug, error};
use serde::Serialize;

use super::filter::FilterState;
use super::pagination::{FetchMode, PageState, Pagination};
use super::provider::{LeaderboardError, RankingQuery};
use super::types::{Epoch, RankedEntry, RankedPage};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum FetchStatus {
    #[default]
    Idle,
    Fetching {
        offset: u32,
    },
    Loaded,
    Failed,
}

/// What a fetch did to the result set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Replaced { received: usize },
    Appended { received: usize },
    /// Nothing requested: the epoch is exhausted or a page is already loading
    Skipped,
    /// Response belonged to an epoch that has since been superseded
    Discarded { epoch: Epoch },
}

/// Owns the result set and decides how each response is applied.
///
/// Requests are tagged with the epoch they were issued in. Settling a
/// response from an older epoch leaves every piece of state untouched.
#[derive(Clone, Debug)]
pub struct FetchCoordinator {
    epoch: Epoch,
    filter: FilterState,
    entries: Vec<RankedEntry>,
    pagination: Pagination,
    status: FetchStatus,
    last_error: Option<LeaderboardError>,
    applied: u64,
}

impl FetchCoordinator {
    pub fn new(limit: u32) -> Self {
        Self {
            epoch: Epoch::default(),
            filter: FilterState::default(),
            entries: Vec::new(),
            pagination: Pagination::new(limit),
            status: FetchStatus::Idle,
            last_error: None,
            applied: 0,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Filter the current epoch was started with
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn page(&self) -> PageState {
        self.pagination.page()
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&LeaderboardError> {
        self.last_error.as_ref()
    }

    /// Responses applied so far, successful or failed; discards don't count
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn is_fetching(&self) -> bool {
        self.pagination.is_fetching()
    }

    /// Start a new epoch for `filter`: clear results and request page 0.
    pub fn begin_epoch(&mut self, filter: FilterState) -> RankingQuery {
        self.epoch = self.epoch.next();
        self.filter = filter;
        self.entries.clear();
        self.last_error = None;

        let page = self.pagination.reset(self.epoch);
        self.status = FetchStatus::Fetching { offset: 0 };
        debug!("Leaderboard epoch {} started: {:?}", self.epoch, self.filter);

        RankingQuery {
            page,
            filter: self.filter.clone(),
        }
    }

    /// Request the next page of the current epoch, if one may exist and no
    /// fetch is running.
    pub fn begin_next_page(&mut self) -> Option<RankingQuery> {
        let page = self.pagination.next_page(self.epoch)?;
        self.status = FetchStatus::Fetching {
            offset: page.offset,
        };

        Some(RankingQuery {
            page,
            filter: self.filter.clone(),
        })
    }

    /// Apply the result of `query`.
    ///
    /// Failures of the current epoch are returned and recorded; results and
    /// page state stay as they were.
    pub fn settle(
        &mut self,
        query: &RankingQuery,
        result: Result<RankedPage, LeaderboardError>,
    ) -> Result<FetchOutcome, LeaderboardError> {
        let request = &query.page;
        if request.epoch != self.epoch {
            debug!(
                "Dropping response for stale epoch {} (current {})",
                request.epoch, self.epoch
            );
            return Ok(FetchOutcome::Discarded {
                epoch: request.epoch,
            });
        }

        match result {
            Ok(RankedPage { entries, rows }) => {
                let received = entries.len();
                if !self.pagination.complete(request, rows) {
                    debug!("Dropping response for request no longer in flight: {request:?}");
                    return Ok(FetchOutcome::Discarded {
                        epoch: request.epoch,
                    });
                }

                self.applied += 1;
                self.status = FetchStatus::Loaded;
                self.last_error = None;
                match request.mode {
                    FetchMode::Reset => {
                        self.entries = entries;
                        Ok(FetchOutcome::Replaced { received })
                    }
                    FetchMode::Append => {
                        self.entries.extend(entries);
                        Ok(FetchOutcome::Appended { received })
                    }
                }
            }
            Err(err) => {
                if !self.pagination.fail(request) {
                    return Ok(FetchOutcome::Discarded {
                        epoch: request.epoch,
                    });
                }

                error!(
                    "Error fetching leaderboard data (epoch {}, offset {}): {err}",
                    request.epoch, request.offset
                );
                self.applied += 1;
                self.status = FetchStatus::Failed;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}
