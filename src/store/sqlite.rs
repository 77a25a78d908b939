//! SQLite entry store
//!
//! One `entries` table in `journal.db`. Scalar fields get their own columns;
//! photos, hashtags and poses are stored as JSON text so that an absent list
//! and an empty list stay distinguishable.
//!
//! The connection is not `Sync`, so it sits behind a mutex and every query
//! runs on the blocking pool.

use async_trait::async_trait;
use chrono::DateTime;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::journal::{EntryPatch, JournalEntry, NewEntry};
use crate::store::error::{StoreError, StoreResult};
use crate::store::EntryStore;

const DB_FILE: &str = "journal.db";

const SELECT_COLUMNS: &str = "SELECT id, date, photos, notes, hashtags, poses, duration, intensity, is_favorite FROM entries";

/// SQLite-backed entry store
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteStore {
    /// Create or open `journal.db` under `data_dir`
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        Self::open_file(&data_dir.join(DB_FILE))
    }

    /// Create or open a database at an explicit path
    pub fn open_file(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                date_ts INTEGER NOT NULL,
                photos TEXT NOT NULL,
                notes TEXT NOT NULL,
                hashtags TEXT NOT NULL,
                poses TEXT NOT NULL,
                duration TEXT,
                intensity INTEGER,
                is_favorite INTEGER
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date_ts)",
            [],
        )?;

        tracing::debug!("Opened journal database at {:?}", path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| StoreError::Lock(e.to_string()))?;
            f(&mut guard)
        })
        .await?
    }
}

/// Raw column values, decoded after the row borrow ends
struct EntryRow {
    id: String,
    date: String,
    photos: String,
    notes: String,
    hashtags: String,
    poses: String,
    duration: Option<String>,
    intensity: Option<i64>,
    is_favorite: Option<bool>,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            photos: row.get(2)?,
            notes: row.get(3)?,
            hashtags: row.get(4)?,
            poses: row.get(5)?,
            duration: row.get(6)?,
            intensity: row.get(7)?,
            is_favorite: row.get(8)?,
        })
    }

    fn into_entry(self) -> StoreResult<JournalEntry> {
        let intensity = self
            .intensity
            .map(u8::try_from)
            .transpose()
            .map_err(|_| StoreError::Serialization(format!("entry {}: bad intensity", self.id)))?;

        Ok(JournalEntry {
            date: DateTime::parse_from_rfc3339(&self.date)?,
            photos: serde_json::from_str(&self.photos)?,
            notes: self.notes,
            hashtags: serde_json::from_str(&self.hashtags)?,
            poses: serde_json::from_str(&self.poses)?,
            duration: self.duration,
            intensity,
            is_favorite: self.is_favorite,
            id: self.id,
        })
    }
}

fn write_entry(conn: &Connection, entry: &JournalEntry, replace: bool) -> StoreResult<()> {
    let sql = if replace {
        "INSERT OR REPLACE INTO entries
            (id, date, date_ts, photos, notes, hashtags, poses, duration, intensity, is_favorite)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    } else {
        "INSERT INTO entries
            (id, date, date_ts, photos, notes, hashtags, poses, duration, intensity, is_favorite)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    };

    let mut stmt = conn.prepare_cached(sql)?;
    stmt.execute(params![
        entry.id,
        entry.date.to_rfc3339(),
        entry.date.timestamp_millis(),
        serde_json::to_string(&entry.photos)?,
        entry.notes,
        serde_json::to_string(&entry.hashtags)?,
        serde_json::to_string(&entry.poses)?,
        entry.duration,
        entry.intensity,
        entry.is_favorite,
    ])?;
    Ok(())
}

fn find_entry(conn: &Connection, id: &str) -> StoreResult<Option<JournalEntry>> {
    let mut stmt = conn.prepare_cached(&format!("{} WHERE id = ?", SELECT_COLUMNS))?;
    stmt.query_row(params![id], EntryRow::from_row)
        .optional()?
        .map(EntryRow::into_entry)
        .transpose()
}

fn exists(conn: &Connection, id: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM entries WHERE id = ?")?;
    Ok(stmt.exists(params![id])?)
}

#[async_trait]
impl EntryStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self) -> StoreResult<Vec<JournalEntry>> {
        self.with_conn(|conn| {
            // rowid keeps insertion order among equal timestamps
            let mut stmt = conn.prepare_cached(&format!(
                "{} ORDER BY date_ts DESC, rowid ASC",
                SELECT_COLUMNS
            ))?;
            let rows = stmt.query_map([], EntryRow::from_row)?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?.into_entry()?);
            }
            Ok(entries)
        })
        .await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<JournalEntry>> {
        let id = id.to_string();
        self.with_conn(move |conn| find_entry(conn, &id)).await
    }

    async fn insert(&self, entry: NewEntry) -> StoreResult<JournalEntry> {
        let entry = entry.into_entry(Uuid::new_v4().to_string())?;
        let stored = self
            .with_conn(move |conn| {
                write_entry(conn, &entry, false)?;
                Ok(entry)
            })
            .await?;

        tracing::info!(entry_id = %stored.id, "Inserted entry");
        Ok(stored)
    }

    async fn restore(&self, entry: JournalEntry) -> StoreResult<JournalEntry> {
        let entry = entry.normalize();
        entry.validate()?;
        self.with_conn(move |conn| {
            if exists(conn, &entry.id)? {
                return Err(StoreError::AlreadyExists(entry.id));
            }
            write_entry(conn, &entry, false)?;
            Ok(entry)
        })
        .await
    }

    async fn update(&self, id: &str, patch: EntryPatch) -> StoreResult<JournalEntry> {
        let id = id.to_string();
        let updated = self
            .with_conn(move |conn| {
                let tx = conn.transaction()?;
                let current =
                    find_entry(&tx, &id)?.ok_or_else(|| StoreError::NotFound(id.clone()))?;
                let updated = patch.apply(&current)?;
                write_entry(&tx, &updated, true)?;
                tx.commit()?;
                Ok(updated)
            })
            .await?;

        tracing::info!(entry_id = %updated.id, "Updated entry");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<JournalEntry> {
        let id = id.to_string();
        let removed = self
            .with_conn(move |conn| {
                let tx = conn.transaction()?;
                let current =
                    find_entry(&tx, &id)?.ok_or_else(|| StoreError::NotFound(id.clone()))?;
                tx.execute("DELETE FROM entries WHERE id = ?", params![id])?;
                tx.commit()?;
                Ok(current)
            })
            .await?;

        tracing::info!(entry_id = %removed.id, "Deleted entry");
        Ok(removed)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{PhotoEntry, PhotoTheme, YogaPose};
    use chrono::{FixedOffset, TimeZone};
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn on_day(day: u32) -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 8, day, 7, 30, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let (store, _dir) = create_test_store();

        let created = store
            .insert(
                NewEntry::new("hip openers")
                    .date(on_day(5))
                    .photo(PhotoEntry::new("https://cdn/p1.jpg").theme(PhotoTheme::BeforeAfter))
                    .hashtag("빈야사")
                    .pose(YogaPose::new("Pigeon", "Kapotasana"))
                    .duration("45분")
                    .intensity(3),
            )
            .await
            .unwrap();

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.date.offset().local_minus_utc(), 9 * 3600);

        let updated = store
            .update(&created.id, EntryPatch::favorite(true))
            .await
            .unwrap();
        assert!(updated.is_favorite());
        assert_eq!(updated.photos().len(), 1);

        let removed = store.delete(&created.id).await.unwrap();
        assert_eq!(removed.id, created.id);
        assert!(store.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_absent_lists_survive_storage() {
        let (store, _dir) = create_test_store();

        let mut entry = NewEntry::new("quiet").into_entry("legacy-1").unwrap();
        entry.hashtags = None;
        entry.poses = None;
        store.restore(entry.clone()).await.unwrap();

        let fetched = store.get("legacy-1").await.unwrap().unwrap();
        assert_eq!(fetched.hashtags, None);
        assert_eq!(fetched.poses, None);
        assert_eq!(fetched, entry);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (store, _dir) = create_test_store();
        for day in [2, 9, 4] {
            store
                .insert(NewEntry::new(format!("day {}", day)).date(on_day(day)))
                .await
                .unwrap();
        }

        let notes: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.notes)
            .collect();
        assert_eq!(notes, vec!["day 9", "day 4", "day 2"]);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let (store, _dir) = create_test_store();
        assert!(matches!(
            store.update("nope", EntryPatch::favorite(true)).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("nope").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_row_untouched() {
        let (store, _dir) = create_test_store();
        let created = store.insert(NewEntry::new("keep me")).await.unwrap();

        let patch = EntryPatch {
            notes: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            store.update(&created.id, patch).await,
            Err(StoreError::Validation(_))
        ));
        assert_eq!(
            store.get(&created.id).await.unwrap().unwrap().notes,
            "keep me"
        );
    }

    #[tokio::test]
    async fn test_entries_persist_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let id = {
            let store = SqliteStore::open(temp_dir.path()).unwrap();
            store.insert(NewEntry::new("persisted")).await.unwrap().id
        };

        let store = SqliteStore::open(temp_dir.path()).unwrap();
        store.ping().await.unwrap();
        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.notes, "persisted");
    }

    #[tokio::test]
    async fn test_restore_rejects_existing_id() {
        let (store, _dir) = create_test_store();
        let entry = NewEntry::new("once").into_entry("dup").unwrap();

        store.restore(entry.clone()).await.unwrap();
        assert!(matches!(
            store.restore(entry).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_restore_clears_unrated_values() {
        let (store, _dir) = create_test_store();
        let mut entry = NewEntry::new("unrated").into_entry("old-1").unwrap();
        entry.intensity = Some(0);
        entry.duration = Some(String::new());

        let restored = store.restore(entry).await.unwrap();
        assert_eq!(restored.intensity, None);
        assert_eq!(restored.duration, None);

        let stored = store.get("old-1").await.unwrap().unwrap();
        assert_eq!(stored.intensity, None);
    }
}
