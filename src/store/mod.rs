//! Entry Store
//!
//! Persistence for journal entries behind one async trait. Three backends:
//!
//! - **memory**: process-local, for tests and demos
//! - **sqlite**: a single `journal.db` file under the data directory
//! - **supabase**: the hosted PostgREST table the mobile app syncs with
//!
//! Analytics never touch a store directly; callers list entries and hand the
//! slice to the pure functions in [`crate::analytics`].

pub mod backup;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod supabase;

pub use backup::{merge_restore, restore_entries, Backup, RejectedEntry, RestorePlan, RestoreReport};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};
use crate::journal::{EntryPatch, JournalEntry, NewEntry};

/// Async persistence for journal entries
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Short backend identifier for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Every entry, newest first
    async fn list(&self) -> StoreResult<Vec<JournalEntry>>;

    async fn get(&self, id: &str) -> StoreResult<Option<JournalEntry>>;

    /// Validate and store a new entry under a fresh id
    async fn insert(&self, entry: NewEntry) -> StoreResult<JournalEntry>;

    /// Store an entry keeping its id, as read from a backup
    ///
    /// Intensity 0 and blank durations are cleared before validation.
    async fn restore(&self, entry: JournalEntry) -> StoreResult<JournalEntry>;

    /// Merge `patch` into an existing entry
    async fn update(&self, id: &str, patch: EntryPatch) -> StoreResult<JournalEntry>;

    /// Remove an entry, returning what was removed
    async fn delete(&self, id: &str) -> StoreResult<JournalEntry>;

    async fn toggle_favorite(&self, id: &str) -> StoreResult<JournalEntry> {
        let entry = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.update(id, EntryPatch::favorite(!entry.is_favorite()))
            .await
    }

    /// Cheap reachability check
    async fn ping(&self) -> StoreResult<()> {
        self.list().await.map(|_| ())
    }
}

/// Build the configured backend
pub fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn EntryStore>> {
    let store: Arc<dyn EntryStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(Path::new(&config.data_dir))?),
        StoreBackend::Supabase => Arc::new(SupabaseStore::new(config.supabase.clone())?),
    };

    tracing::info!(backend = store.backend_name(), "Opened entry store");
    Ok(store)
}

/// Newest first; entries sharing a timestamp keep their relative order
pub(crate) fn sort_newest_first(entries: &mut [JournalEntry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
}
