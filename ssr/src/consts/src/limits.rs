use web_time::Duration;

/// Entries requested per page
pub const LEADERBOARD_PAGE_LIMIT: u32 = 5;

/// Quiescence required after the last filter change before a refetch
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(500);

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
