use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct RankedEntry {
    #[serde(rename = "user_id", alias = "userId")]
    pub user_id: i64,
    #[serde(
        rename = "full_name",
        alias = "fullName",
        alias = "displayName",
        alias = "display_name",
        default
    )]
    pub display_name: String,
    #[serde(
        rename = "totalPoints",
        alias = "total_points",
        default,
        deserialize_with = "points_from_number_or_string"
    )]
    pub total_points: f64,
    pub rank: u32,
}

// Aggregated points sometimes arrive as numeric strings, or null for a
// window with no activity
#[derive(Deserialize)]
#[serde(untagged)]
enum Points {
    Number(f64),
    Text(String),
}

fn points_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Points>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Points::Number(points)) => Ok(points),
        Some(Points::Text(text)) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// One page from the ranking endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RankedPage {
    pub entries: Vec<RankedEntry>,
    /// Rows the server sent, counting ones that could not be decoded
    pub rows: usize,
}

impl From<Vec<RankedEntry>> for RankedPage {
    fn from(entries: Vec<RankedEntry>) -> Self {
        Self {
            rows: entries.len(),
            entries,
        }
    }
}

/// Version tag scoping requests to one filter context.
///
/// Bumped on every filter commit or recalculation; responses tagged with an
/// older epoch are dropped on arrival.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Default)]
pub(crate) struct LeaderboardEnvelope {
    #[serde(default)]
    pub data: Option<LeaderboardPayload>,
}

#[derive(Deserialize, Default)]
pub(crate) struct LeaderboardPayload {
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_wire_entry() {
        let entry: RankedEntry = serde_json::from_value(json!({
            "user_id": 7,
            "full_name": "Grace Hopper",
            "totalPoints": 1200.5,
            "rank": 2
        }))
        .unwrap();

        assert_eq!(
            entry,
            RankedEntry {
                user_id: 7,
                display_name: "Grace Hopper".into(),
                total_points: 1200.5,
                rank: 2,
            }
        );
    }

    #[test]
    fn tolerates_camel_case_and_string_points() {
        let entry: RankedEntry = serde_json::from_value(json!({
            "userId": 3,
            "displayName": "Linus",
            "total_points": " 42 ",
            "rank": 1
        }))
        .unwrap();

        assert_eq!(entry.user_id, 3);
        assert_eq!(entry.display_name, "Linus");
        assert_eq!(entry.total_points, 42.0);
    }

    #[test]
    fn rejects_non_numeric_points() {
        let result = serde_json::from_value::<RankedEntry>(json!({
            "user_id": 3,
            "full_name": "Linus",
            "totalPoints": "lots",
            "rank": 1
        }));

        assert!(result.is_err());
    }

    #[test]
    fn null_or_missing_points_are_zero() {
        let null: RankedEntry = serde_json::from_value(json!({
            "user_id": 5,
            "full_name": "Idle",
            "totalPoints": null,
            "rank": 9
        }))
        .unwrap();
        assert_eq!(null.total_points, 0.0);

        let missing: RankedEntry =
            serde_json::from_value(json!({ "user_id": 6, "rank": 10 })).unwrap();
        assert_eq!(missing.total_points, 0.0);
        assert_eq!(missing.display_name, "");
    }

    #[test]
    fn epochs_are_ordered() {
        let first = Epoch::default().next();
        assert_eq!(first, Epoch(1));
        assert!(first.next() > first);
    }
}
