use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use super::filter::FilterState;
use super::pagination::PageRequest;
use super::types::RankedPage;

/// Failures surfaced to the caller. Stale and malformed responses are not
/// errors and never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    #[error("Request failed: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("API error: {0}")]
    Status(u16),
    #[error("Fetch task did not complete: {0}")]
    Task(String),
}

impl From<reqwest::Error> for LeaderboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LeaderboardError::Timeout
        } else if let Some(status) = err.status() {
            LeaderboardError::Status(status.as_u16())
        } else {
            LeaderboardError::Network(err.to_string())
        }
    }
}

/// One page query against the ranking endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct RankingQuery {
    pub page: PageRequest,
    /// Committed filter the epoch was started with
    pub filter: FilterState,
}

/// Source of ranked pages. The HTTP client implements this, tests script it.
pub trait RankingProvider: Send + Sync + 'static {
    fn fetch_page(
        &self,
        query: &RankingQuery,
    ) -> impl Future<Output = Result<RankedPage, LeaderboardError>> + Send;
}

impl<P: RankingProvider> RankingProvider for Arc<P> {
    fn fetch_page(
        &self,
        query: &RankingQuery,
    ) -> impl Future<Output = Result<RankedPage, LeaderboardError>> + Send {
        (**self).fetch_page(query)
    }
}
