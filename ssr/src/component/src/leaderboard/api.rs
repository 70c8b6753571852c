use consts::LEADERBOARD_PATH;
use reqwest::Url;
use web_time::Duration;

use super::provider::{LeaderboardError, RankingProvider, RankingQuery};
use super::types::{LeaderboardEnvelope, LeaderboardPayload, RankedEntry, RankedPage};

/// Ranking endpoint client.
#[derive(Clone, Debug)]
pub struct HttpRankingProvider {
    client: reqwest::Client,
    base: Url,
}

impl HttpRankingProvider {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, LeaderboardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeaderboardError::Network(format!("Failed to build client: {e}")))?;

        Ok(Self { client, base })
    }

    pub fn leaderboard_url(&self, query: &RankingQuery) -> Result<Url, LeaderboardError> {
        let mut url = self
            .base
            .join(LEADERBOARD_PATH)
            .map_err(|e| LeaderboardError::Network(format!("Failed to build URL: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("limit", &query.page.limit.to_string())
                .append_pair("offset", &query.page.offset.to_string());
            for (key, value) in query.filter.query_pairs() {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

impl RankingProvider for HttpRankingProvider {
    async fn fetch_page(&self, query: &RankingQuery) -> Result<RankedPage, LeaderboardError> {
        let url = self.leaderboard_url(query)?;

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeaderboardError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(parse_leaderboard_body(&body))
    }
}

/// Pull entries out of the `{ data: { data: [...] } }` envelope.
///
/// A missing or malformed envelope is an empty page, not an error. Rows are
/// decoded one at a time; a row that fails is skipped but still counted in
/// [`RankedPage::rows`] so pagination sees the page the server sent.
pub fn parse_leaderboard_body(body: &[u8]) -> RankedPage {
    let rows = match serde_json::from_slice::<LeaderboardEnvelope>(body) {
        Ok(LeaderboardEnvelope {
            data: Some(LeaderboardPayload { data: Some(rows) }),
        }) => rows,
        Ok(_) => {
            log::warn!("Leaderboard response has no data envelope, treating as empty page");
            return RankedPage::default();
        }
        Err(e) => {
            log::warn!("Malformed leaderboard response, treating as empty page: {e}");
            return RankedPage::default();
        }
    };

    let total = rows.len();
    let entries = rows
        .into_iter()
        .enumerate()
        .filter_map(|(idx, row)| match serde_json::from_value::<RankedEntry>(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping leaderboard row {idx}: {e}");
                None
            }
        })
        .collect();

    RankedPage {
        entries,
        rows: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_envelope() {
        let body = br#"{"data":{"data":[
            {"user_id":1,"full_name":"Ada","totalPoints":90,"rank":1},
            {"user_id":2,"full_name":"Alan","totalPoints":"75","rank":2}
        ]}}"#;

        let page = parse_leaderboard_body(body);
        assert_eq!(page.rows, 2);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[1].display_name, "Alan");
        assert_eq!(page.entries[1].total_points, 75.0);
    }

    #[test]
    fn bad_row_is_skipped_without_dropping_the_page() {
        let body = br#"{"data":{"data":[
            {"user_id":1,"full_name":"Ada","totalPoints":90,"rank":1},
            {"user_id":2,"full_name":"Alan","totalPoints":null,"rank":2},
            {"user_id":3,"full_name":"Edsger","totalPoints":60},
            {"full_name":"Nobody","totalPoints":10,"rank":4}
        ]}}"#;

        let page = parse_leaderboard_body(body);
        assert_eq!(page.rows, 4);
        let ids: Vec<i64> = page.entries.iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(page.entries[1].total_points, 0.0);
    }

    #[test]
    fn missing_envelope_is_empty_page() {
        for body in [
            &br#"{"data":{}}"#[..],
            br#"{"message":"ok"}"#,
            br#"{"data":null}"#,
        ] {
            assert_eq!(parse_leaderboard_body(body), RankedPage::default());
        }
    }

    #[test]
    fn malformed_body_is_empty_page() {
        for body in [&b"<html>"[..], br#"{"data":{"data":"nope"}}"#, b""] {
            assert_eq!(parse_leaderboard_body(body), RankedPage::default());
        }
    }
}
