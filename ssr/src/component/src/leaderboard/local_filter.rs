use super::types::RankedEntry;

/// Narrow already-fetched entries to an exact user id.
///
/// A term that is not an integer matches everything, so partially typed or
/// cleared input shows the whole list.
pub fn filter_by_user_id<'a>(entries: &'a [RankedEntry], term: &str) -> Vec<&'a RankedEntry> {
    match term.trim().parse::<i64>() {
        Ok(user_id) => entries.iter().filter(|e| e.user_id == user_id).collect(),
        Err(_) => entries.iter().collect(),
    }
}
