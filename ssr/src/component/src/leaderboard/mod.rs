pub mod api;
pub mod controller;
pub mod coordinator;
pub mod filter;
pub mod local_filter;
pub mod pagination;
pub mod provider;
pub mod types;

pub use api::HttpRankingProvider;
pub use controller::{LeaderboardConfig, LeaderboardController, LeaderboardView};
pub use coordinator::{FetchCoordinator, FetchOutcome, FetchStatus};
pub use filter::{FilterState, TimeWindow};
pub use pagination::{FetchMode, PageRequest, PageState, Pagination};
pub use provider::{LeaderboardError, RankingProvider, RankingQuery};
pub use types::{Epoch, RankedEntry, RankedPage};
