//! In-memory entry store
//!
//! A single owned collection behind a lock. Used for tests, demos and the
//! `memory` backend; contents are lost on restart.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::journal::{EntryPatch, JournalEntry, NewEntry};
use crate::store::error::{StoreError, StoreResult};
use crate::store::{sort_newest_first, EntryStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<JournalEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing entries
    pub fn with_entries(entries: Vec<JournalEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> StoreResult<Vec<JournalEntry>> {
        let mut entries = self.entries.read().await.clone();
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<JournalEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn insert(&self, entry: NewEntry) -> StoreResult<JournalEntry> {
        let entry = entry.into_entry(Uuid::new_v4().to_string())?;
        self.entries.write().await.push(entry.clone());
        tracing::info!(entry_id = %entry.id, "Inserted entry");
        Ok(entry)
    }

    async fn restore(&self, entry: JournalEntry) -> StoreResult<JournalEntry> {
        let entry = entry.normalize();
        entry.validate()?;
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(StoreError::AlreadyExists(entry.id));
        }
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, id: &str, patch: EntryPatch) -> StoreResult<JournalEntry> {
        let mut entries = self.entries.write().await;
        let slot = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let updated = patch.apply(slot)?;
        *slot = updated.clone();
        tracing::info!(entry_id = %id, "Updated entry");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<JournalEntry> {
        let mut entries = self.entries.write().await;
        let idx = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let removed = entries.remove(idx);
        tracing::info!(entry_id = %id, "Deleted entry");
        Ok(removed)
    }
}
