use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Time window the ranking is computed over. Filtering happens server-side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    #[default]
    None,
    Day,
    Month,
    Year,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::None,
        TimeWindow::Day,
        TimeWindow::Month,
        TimeWindow::Year,
    ];

    /// Value sent as the `filter` query parameter
    pub fn as_query_value(self) -> &'static str {
        match self {
            TimeWindow::None => "",
            TimeWindow::Day => "Day",
            TimeWindow::Month => "Month",
            TimeWindow::Year => "Year",
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeWindow::None => write!(f, "All time"),
            other => write!(f, "{}", other.as_query_value()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time window {0:?}, expected one of none, day, month, year")]
pub struct ParseTimeWindowError(pub String);

impl FromStr for TimeWindow {
    type Err = ParseTimeWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "all" => Ok(TimeWindow::None),
            "day" => Ok(TimeWindow::Day),
            "month" => Ok(TimeWindow::Month),
            "year" => Ok(TimeWindow::Year),
            _ => Err(ParseTimeWindowError(s.to_string())),
        }
    }
}

/// Filter inputs as typed by the viewer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    /// User id search, empty means no filter
    pub search_term: String,
    pub time_window: TimeWindow,
}

impl FilterState {
    pub fn new(search_term: impl Into<String>, time_window: TimeWindow) -> Self {
        Self {
            search_term: search_term.into(),
            time_window,
        }
    }

    /// `filter` and `search` query parameters, in request order
    pub fn query_pairs(&self) -> [(&'static str, &str); 2] {
        [
            ("filter", self.time_window.as_query_value()),
            ("search", self.search_term.as_str()),
        ]
    }
}
