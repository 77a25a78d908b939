//! Backup and restore
//!
//! A backup is every entry as JSON. Restoring merges a backup into the
//! current journal: ids that already exist are skipped, everything else is
//! inserted with its original id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::journal::JournalEntry;
use crate::store::error::{StoreError, StoreResult};
use crate::store::{sort_newest_first, EntryStore};

/// Current backup document version
pub const BACKUP_VERSION: u32 = 1;

/// Exported journal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub entries: Vec<JournalEntry>,
}

/// Accepted backup layouts; older exports are a bare entry array
#[derive(Deserialize)]
#[serde(untagged)]
enum BackupDocument {
    Versioned(Backup),
    Bare(Vec<JournalEntry>),
}

impl Backup {
    pub fn from_entries(entries: Vec<JournalEntry>) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at: Utc::now(),
            entries,
        }
    }

    /// Parse either a versioned document or a bare array of entries
    pub fn parse(json: &str) -> StoreResult<Self> {
        let document: BackupDocument = serde_json::from_str(json)?;
        let backup = match document {
            BackupDocument::Versioned(backup) => backup,
            BackupDocument::Bare(entries) => Self::from_entries(entries),
        };

        if backup.version > BACKUP_VERSION {
            return Err(StoreError::Serialization(format!(
                "backup version {} is newer than supported version {}",
                backup.version, BACKUP_VERSION
            )));
        }
        Ok(backup)
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What a restore would change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestorePlan {
    /// New entries, newest first
    pub to_insert: Vec<JournalEntry>,
    /// Ids already present (or repeated within the backup)
    pub skipped: Vec<String>,
}

/// Split `restored` into entries to insert and ids to skip
pub fn merge_restore(current: &[JournalEntry], restored: Vec<JournalEntry>) -> RestorePlan {
    let mut seen: HashSet<String> = current.iter().map(|e| e.id.clone()).collect();
    let mut plan = RestorePlan::default();

    for entry in restored {
        if seen.insert(entry.id.clone()) {
            plan.to_insert.push(entry);
        } else {
            plan.skipped.push(entry.id);
        }
    }

    sort_newest_first(&mut plan.to_insert);
    plan
}

/// Entry that could not be restored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectedEntry {
    pub id: String,
    pub error: String,
}

/// Outcome of a restore
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RestoreReport {
    pub inserted: usize,
    pub skipped: Vec<String>,
    pub rejected: Vec<RejectedEntry>,
}

/// Merge `restored` into `store`
///
/// Invalid entries are reported and skipped; store failures abort.
pub async fn restore_entries(
    store: &dyn EntryStore,
    restored: Vec<JournalEntry>,
) -> StoreResult<RestoreReport> {
    let current = store.list().await?;
    let plan = merge_restore(&current, restored);

    let mut report = RestoreReport {
        skipped: plan.skipped,
        ..Default::default()
    };

    for entry in plan.to_insert {
        let id = entry.id.clone();
        match store.restore(entry).await {
            Ok(_) => report.inserted += 1,
            Err(StoreError::AlreadyExists(id)) => report.skipped.push(id),
            Err(StoreError::Validation(e)) => {
                tracing::warn!(entry_id = %id, "Rejected restored entry: {}", e);
                report.rejected.push(RejectedEntry {
                    id,
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped.len(),
        rejected = report.rejected.len(),
        "Restore complete"
    );
    Ok(report)
}
