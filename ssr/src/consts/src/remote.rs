use once_cell::sync::Lazy;
use reqwest::Url;

pub static LEADERBOARD_API_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://api.leaderboard.app").unwrap());
