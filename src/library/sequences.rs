//! Frequent pose sequences
//!
//! A sequence is an ordered pair of poses practiced back to back within one
//! entry. Pairs are keyed by pose name, so `A → B` and `B → A` are different
//! sequences.

use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::journal::{JournalEntry, YogaPose};

/// Number of sequences surfaced by default
pub const DEFAULT_TOP_SEQUENCES: usize = 3;

/// An adjacent pose pair and how often it was practiced
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PoseSequence {
    /// Snapshots from the pair's first occurrence
    pub poses: [YogaPose; 2],
    pub count: usize,
}

impl PoseSequence {
    /// "A → B"
    pub fn label(&self) -> String {
        format!("{} → {}", self.poses[0].name, self.poses[1].name)
    }
}

/// The `top_n` most practiced adjacent pairs seen more than once
///
/// Ties keep the order in which the pairs were first seen.
pub fn mine_frequent_sequences(entries: &[JournalEntry], top_n: usize) -> Vec<PoseSequence> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut sequences: Vec<PoseSequence> = Vec::new();

    for entry in entries {
        for pair in entry.poses().windows(2) {
            let key = (pair[0].name.as_str(), pair[1].name.as_str());
            match index.entry(key) {
                Entry::Occupied(slot) => sequences[*slot.get()].count += 1,
                Entry::Vacant(slot) => {
                    slot.insert(sequences.len());
                    sequences.push(PoseSequence {
                        poses: [pair[0].clone(), pair[1].clone()],
                        count: 1,
                    });
                }
            }
        }
    }

    sequences.retain(|seq| seq.count > 1);
    // stable: equal counts stay in first-seen order
    sequences.sort_by(|a, b| b.count.cmp(&a.count));
    sequences.truncate(top_n);
    sequences
}
