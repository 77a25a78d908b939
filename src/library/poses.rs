//! Pose library
//!
//! Collects every pose that appears in the journal, with the entries it was
//! practiced in. Poses are grouped by name.

use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::journal::{JournalEntry, YogaPose};

/// A pose and the entries it appears in
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PoseWithEntries<'a> {
    /// First snapshot seen under this name
    pub pose: &'a YogaPose,
    /// Each entry once, in entry order
    pub entries: Vec<&'a JournalEntry>,
}

impl PoseWithEntries<'_> {
    pub fn times_practiced(&self) -> usize {
        self.entries.len()
    }
}

/// Build the library, sorted by pose name
pub fn pose_library(entries: &[JournalEntry]) -> Vec<PoseWithEntries<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut library: Vec<PoseWithEntries<'_>> = Vec::new();

    for entry in entries {
        for pose in entry.poses() {
            match index.entry(pose.name.as_str()) {
                Entry::Occupied(slot) => {
                    let item = &mut library[*slot.get()];
                    // stored rows may list a pose twice
                    if !item.entries.last().is_some_and(|e| std::ptr::eq(*e, entry)) {
                        item.entries.push(entry);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(library.len());
                    library.push(PoseWithEntries {
                        pose,
                        entries: vec![entry],
                    });
                }
            }
        }
    }

    library.sort_by(|a, b| a.pose.name.cmp(&b.pose.name));
    library
}

/// Library items whose pose name or sanskrit name contains `query`
pub fn filter_poses<'a>(library: Vec<PoseWithEntries<'a>>, query: &str) -> Vec<PoseWithEntries<'a>> {
    let query = query.trim();
    if query.is_empty() {
        return library;
    }

    let needle = query.to_lowercase();
    library
        .into_iter()
        .filter(|item| {
            item.pose.name.to_lowercase().contains(&needle)
                || item.pose.sanskrit_name.to_lowercase().contains(&needle)
        })
        .collect()
}
