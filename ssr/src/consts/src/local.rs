use once_cell::sync::Lazy;
use reqwest::Url;

pub static LEADERBOARD_API_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://localhost:8000").unwrap());
