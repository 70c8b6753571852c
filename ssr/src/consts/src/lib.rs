#[cfg(feature = "local")]
mod local;
#[cfg(feature = "local")]
pub use local::*;

#[cfg(not(feature = "local"))]
mod remote;
#[cfg(not(feature = "local"))]
pub use remote::*;

pub mod limits;

pub const LEADERBOARD_PATH: &str = "api/v1/activity/leaderboard";

/// Env vars checked, in order, for a base URL override.
pub const BASE_URL_ENV_KEYS: [&str; 2] = ["LEADERBOARD_BASE_URL", "VITE_BASE_URL"];

pub mod env {
    pub const PAGE_LIMIT: &str = "LEADERBOARD_PAGE_LIMIT";
    pub const DEBOUNCE_MS: &str = "LEADERBOARD_DEBOUNCE_MS";
    pub const TIMEOUT_MS: &str = "LEADERBOARD_TIMEOUT_MS";
    pub const HIGHLIGHT_USER: &str = "LEADERBOARD_HIGHLIGHT_USER";
}
