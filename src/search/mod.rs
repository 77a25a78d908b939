//! Entry search
//!
//! Case-insensitive substring search over the text an entry carries: notes,
//! hashtags, and the names of its poses. Results keep the input order; there
//! is no ranking.

use crate::journal::JournalEntry;

/// Entries matching `query`, in their original order
///
/// An empty (or whitespace-only) query returns every entry.
pub fn filter_entries<'a>(entries: &'a [JournalEntry], query: &str) -> Vec<&'a JournalEntry> {
    let query = query.trim();
    if query.is_empty() {
        return entries.iter().collect();
    }

    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| matches_query(entry, &needle))
        .collect()
}

/// Whether an entry matches an already lower-cased query
pub fn matches_query(entry: &JournalEntry, needle: &str) -> bool {
    contains_folded(&entry.notes, needle)
        || entry.hashtags().iter().any(|tag| contains_folded(tag, needle))
        || entry.poses().iter().any(|pose| {
            contains_folded(&pose.name, needle) || contains_folded(&pose.sanskrit_name, needle)
        })
}

/// Entries flagged as favorites
pub fn favorites_only<'a, I>(entries: I) -> Vec<&'a JournalEntry>
where
    I: IntoIterator<Item = &'a JournalEntry>,
{
    entries
        .into_iter()
        .filter(|entry| entry.is_favorite())
        .collect()
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{NewEntry, YogaPose};

    fn sample_entries() -> Vec<JournalEntry> {
        vec![
            NewEntry::new("오늘은 암 밸런스 동작 위주로 수련했다.")
                .hashtag("암밸런스")
                .hashtag("빈야사")
                .pose(YogaPose::new("Crow Pose", "Bakasana"))
                .into_entry("e1")
                .unwrap(),
            NewEntry::new("Slow HATHA morning, lots of breathing")
                .hashtag("Morning")
                .pose(YogaPose::new("Downward-Facing Dog", "Adho Mukha Svanasana"))
                .favorite(true)
                .into_entry("e2")
                .unwrap(),
            NewEntry::new("restorative evening")
                .into_entry("e3")
                .unwrap(),
        ]
    }

    fn ids(found: &[&JournalEntry]) -> Vec<String> {
        found.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let entries = sample_entries();
        assert_eq!(ids(&filter_entries(&entries, "")), vec!["e1", "e2", "e3"]);
        assert_eq!(ids(&filter_entries(&entries, "   ")), vec!["e1", "e2", "e3"]);
    }

    #[test]
    fn test_hashtag_matches_whole_and_partial() {
        let entries = sample_entries();
        assert_eq!(ids(&filter_entries(&entries, "빈야사")), vec!["e1"]);
        assert_eq!(ids(&filter_entries(&entries, "빈야")), vec!["e1"]);
    }

    #[test]
    fn test_ascii_case_is_ignored() {
        let entries = sample_entries();
        assert_eq!(ids(&filter_entries(&entries, "hatha")), vec!["e2"]);
        assert_eq!(ids(&filter_entries(&entries, "MORNING")), vec!["e2"]);
        assert_eq!(ids(&filter_entries(&entries, "bakasana")), vec!["e1"]);
        assert_eq!(ids(&filter_entries(&entries, "crow")), vec!["e1"]);
    }

    #[test]
    fn test_query_is_trimmed() {
        let entries = sample_entries();
        assert_eq!(ids(&filter_entries(&entries, "  evening ")), vec!["e3"]);
    }

    #[test]
    fn test_missing_collections_are_not_errors() {
        let mut entries = sample_entries();
        entries[2].hashtags = None;
        entries[2].poses = None;
        assert!(filter_entries(&entries[2..], "dog").is_empty());
        assert_eq!(ids(&filter_entries(&entries, "restorative")), vec!["e3"]);
    }

    #[test]
    fn test_favorites_compose_with_search() {
        let entries = sample_entries();
        assert_eq!(ids(&favorites_only(&entries)), vec!["e2"]);

        let found = filter_entries(&entries, "a");
        assert_eq!(ids(&favorites_only(found)), vec!["e2"]);
    }
}
