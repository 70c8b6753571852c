use std::str::FromStr;

use component::leaderboard::LeaderboardConfig;
use consts::{env as keys, BASE_URL_ENV_KEYS, LEADERBOARD_API_BASE};
use reqwest::Url;
use thiserror::Error;
use tracing::warn;
use web_time::Duration;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid leaderboard base URL {value:?}: {reason}")]
    BaseUrl { value: String, reason: String },
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base_url: Url,
    pub leaderboard: LeaderboardConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = match read_first(&lookup, &BASE_URL_ENV_KEYS) {
            Some(value) => parse_base_url(&value)?,
            None => LEADERBOARD_API_BASE.clone(),
        };

        let defaults = LeaderboardConfig::default();
        let limit = parse_var(&lookup, keys::PAGE_LIMIT).unwrap_or(defaults.limit);
        if limit == 0 {
            return Err(ConfigError::ZeroLimit(keys::PAGE_LIMIT));
        }

        let debounce = parse_var(&lookup, keys::DEBOUNCE_MS)
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce);
        let request_timeout = parse_var(&lookup, keys::TIMEOUT_MS)
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_timeout);
        let highlight_user = parse_var(&lookup, keys::HIGHLIGHT_USER);

        Ok(Self {
            base_url,
            leaderboard: LeaderboardConfig {
                limit,
                debounce,
                request_timeout,
                highlight_user,
            },
        })
    }
}

// Url::join drops the last path segment unless it ends in a slash
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value).map_err(|e| ConfigError::BaseUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn read_first(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = read_first(lookup, &[key])?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{key}={raw:?} is not valid, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.base_url, *LEADERBOARD_API_BASE);
        assert_eq!(config.leaderboard, LeaderboardConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("LEADERBOARD_BASE_URL", "http://localhost:3000/backend"),
            ("LEADERBOARD_PAGE_LIMIT", "20"),
            ("LEADERBOARD_DEBOUNCE_MS", "250"),
            ("LEADERBOARD_TIMEOUT_MS", "2000"),
            ("LEADERBOARD_HIGHLIGHT_USER", "1"),
        ])
        .unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:3000/backend/");
        assert_eq!(config.leaderboard.limit, 20);
        assert_eq!(config.leaderboard.debounce, Duration::from_millis(250));
        assert_eq!(config.leaderboard.request_timeout, Duration::from_secs(2));
        assert_eq!(config.leaderboard.highlight_user, Some(1));
    }

    #[test]
    fn falls_back_to_vite_base_url() {
        let config = config_from(&[
            ("LEADERBOARD_BASE_URL", "  "),
            ("VITE_BASE_URL", "https://example.com"),
        ])
        .unwrap();
        assert_eq!(config.base_url.as_str(), "https://example.com/");
    }

    #[test]
    fn invalid_numbers_use_defaults() {
        let config = config_from(&[
            ("LEADERBOARD_PAGE_LIMIT", "many"),
            ("LEADERBOARD_HIGHLIGHT_USER", "me"),
        ])
        .unwrap();
        assert_eq!(config.leaderboard.limit, LeaderboardConfig::default().limit);
        assert_eq!(config.leaderboard.highlight_user, None);
    }

    #[test]
    fn rejects_zero_limit_and_bad_url() {
        assert_eq!(
            config_from(&[("LEADERBOARD_PAGE_LIMIT", "0")]).unwrap_err(),
            ConfigError::ZeroLimit("LEADERBOARD_PAGE_LIMIT")
        );
        assert!(matches!(
            config_from(&[("LEADERBOARD_BASE_URL", "not a url")]),
            Err(ConfigError::BaseUrl { .. })
        ));
    }
}
