//! Post-render attribution report.

use std::collections::HashSet;

/// Extract operator-facing artist credits from the resolved assets' tag
/// sets: entries prefixed `artist:`, stripped of the marker, deduplicated
/// in first-seen order.
pub fn artist_credits<'a>(tag_sets: impl IntoIterator<Item = &'a [String]>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut credits = Vec::new();

    for tags in tag_sets {
        for tag in tags {
            if let Some(name) = tag.strip_prefix("artist:") {
                if !name.is_empty() && seen.insert(name.to_string()) {
                    credits.push(name.to_string());
                }
            }
        }
    }

    credits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_extracts_artist_entries() {
        let a = tags(&["artist:alice", "solo", "screencap"]);
        let b = tags(&["artist:bob"]);
        let credits = artist_credits([a.as_slice(), b.as_slice()]);
        assert_eq!(credits, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_dedups_across_cues_preserving_order() {
        let a = tags(&["artist:alice"]);
        let b = tags(&["artist:bob", "artist:alice"]);
        let credits = artist_credits([a.as_slice(), b.as_slice()]);
        assert_eq!(credits, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_no_artists_yields_empty() {
        let a = tags(&["solo", "safe"]);
        let empty = tags(&[]);
        assert!(artist_credits([a.as_slice(), empty.as_slice()]).is_empty());
    }

    #[test]
    fn test_bare_marker_is_skipped() {
        let a = tags(&["artist:"]);
        assert!(artist_credits([a.as_slice()]).is_empty());
    }
}
