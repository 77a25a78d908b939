//! Supabase entry store
//!
//! Talks to the project's PostgREST endpoint for rows and to the storage API
//! for photo cleanup. Column names are snake_case on the wire:
//!
//! | column        | type        |
//! |---------------|-------------|
//! | `id`          | text / uuid |
//! | `user_id`     | text        |
//! | `date`        | timestamptz |
//! | `photos`      | jsonb       |
//! | `notes`       | text        |
//! | `hashtags`    | jsonb       |
//! | `poses`       | jsonb       |
//! | `duration`    | text        |
//! | `intensity`   | int         |
//! | `is_favorite` | bool        |

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::config::SupabaseConfig;
use crate::journal::{EntryPatch, JournalEntry, NewEntry, PhotoEntry, YogaPose};
use crate::store::error::{StoreError, StoreResult};
use crate::store::EntryStore;

/// Supabase-backed entry store
pub struct SupabaseStore {
    client: Client,
    config: SupabaseConfig,
}

/// One row of the entries table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct EntryRow {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    date: DateTime<FixedOffset>,
    #[serde(default)]
    photos: Option<Vec<PhotoEntry>>,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    hashtags: Option<Vec<String>>,
    #[serde(default)]
    poses: Option<Vec<YogaPose>>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    intensity: Option<u8>,
    #[serde(default)]
    is_favorite: Option<bool>,
}

impl EntryRow {
    fn from_entry(entry: JournalEntry, user_id: Option<String>) -> Self {
        Self {
            id: entry.id,
            user_id,
            date: entry.date,
            photos: entry.photos,
            notes: entry.notes,
            hashtags: entry.hashtags,
            poses: entry.poses,
            duration: entry.duration,
            intensity: entry.intensity,
            is_favorite: entry.is_favorite,
        }
    }

    fn into_entry(self) -> JournalEntry {
        JournalEntry {
            id: self.id,
            date: self.date,
            photos: self.photos,
            notes: self.notes,
            hashtags: self.hashtags,
            poses: self.poses,
            duration: self.duration,
            intensity: self.intensity,
            is_favorite: self.is_favorite,
        }
    }
}

#[derive(Debug, Serialize)]
struct RemoveObjectsRequest {
    prefixes: Vec<String>,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        if config.url.trim().is_empty() || config.anon_key.trim().is_empty() {
            return Err(StoreError::Config(
                "supabase backend needs store.supabase.url and store.supabase.anon_key".into(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url(), self.config.table)
    }

    fn bucket_url(&self) -> String {
        format!(
            "{}/storage/v1/object/{}",
            self.base_url(),
            self.config.photo_bucket
        )
    }

    /// Attach the project key and the caller's token
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.anon_key);
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
    }

    fn rest(&self, method: Method) -> RequestBuilder {
        self.authorize(self.client.request(method, self.table_url()))
    }

    fn list_request(&self) -> RequestBuilder {
        self.rest(Method::GET)
            .query(&[("select", "*"), ("order", "date.desc")])
    }

    fn get_request(&self, id: &str) -> RequestBuilder {
        self.rest(Method::GET)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))])
    }

    fn insert_request(&self, row: &EntryRow) -> RequestBuilder {
        self.rest(Method::POST)
            .header("Prefer", "return=representation")
            .json(&[row])
    }

    fn update_request(&self, id: &str, row: &EntryRow) -> RequestBuilder {
        self.rest(Method::PATCH)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(row)
    }

    fn delete_request(&self, id: &str) -> RequestBuilder {
        self.rest(Method::DELETE)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
    }

    fn remove_photos_request(&self, paths: Vec<String>) -> RequestBuilder {
        self.authorize(self.client.delete(self.bucket_url()))
            .json(&RemoveObjectsRequest { prefixes: paths })
    }

    /// Send a PostgREST request and decode the returned rows
    async fn fetch_rows(&self, request: RequestBuilder) -> StoreResult<Vec<EntryRow>> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn write_row(&self, row: EntryRow) -> StoreResult<JournalEntry> {
        let id = row.id.clone();
        self.fetch_rows(self.insert_request(&row))
            .await?
            .into_iter()
            .next()
            .map(EntryRow::into_entry)
            .ok_or_else(|| StoreError::Remote {
                status: 200,
                body: format!("insert of {} returned no rows", id),
            })
    }

    /// Remove the entry's uploaded photos; failures are only logged
    async fn remove_photos(&self, entry: &JournalEntry) {
        let paths = storage_paths(entry.photos(), &self.config.photo_bucket);
        if paths.is_empty() {
            return;
        }

        let count = paths.len();
        let result = match self.remove_photos_request(paths).send().await {
            Ok(response) => check_status(response).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => tracing::debug!(entry_id = %entry.id, count, "Removed entry photos"),
            Err(e) => tracing::warn!(entry_id = %entry.id, "Failed to remove entry photos: {}", e),
        }
    }
}

/// Map non-success statuses to `StoreError::Remote`
async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Remote {
        status: status.as_u16(),
        body,
    })
}

/// Object paths inside `bucket` for photos hosted there
fn storage_paths(photos: &[PhotoEntry], bucket: &str) -> Vec<String> {
    let marker = format!("/{}/", bucket);
    photos
        .iter()
        .filter_map(|photo| photo.url.split_once(&marker))
        .map(|(_, path)| path.split('?').next().unwrap_or(path))
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl EntryStore for SupabaseStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn list(&self) -> StoreResult<Vec<JournalEntry>> {
        let rows = self.fetch_rows(self.list_request()).await?;
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<JournalEntry>> {
        let rows = self.fetch_rows(self.get_request(id)).await?;
        Ok(rows.into_iter().next().map(EntryRow::into_entry))
    }

    async fn insert(&self, entry: NewEntry) -> StoreResult<JournalEntry> {
        let entry = entry.into_entry(Uuid::new_v4().to_string())?;
        let stored = self
            .write_row(EntryRow::from_entry(entry, self.config.user_id.clone()))
            .await?;

        tracing::info!(entry_id = %stored.id, "Inserted entry");
        Ok(stored)
    }

    async fn restore(&self, entry: JournalEntry) -> StoreResult<JournalEntry> {
        let entry = entry.normalize();
        entry.validate()?;
        if self.get(&entry.id).await?.is_some() {
            return Err(StoreError::AlreadyExists(entry.id));
        }
        self.write_row(EntryRow::from_entry(entry, self.config.user_id.clone()))
            .await
    }

    async fn update(&self, id: &str, patch: EntryPatch) -> StoreResult<JournalEntry> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let updated = patch.apply(&current)?;

        let row = EntryRow::from_entry(updated, None);
        let stored = self
            .fetch_rows(self.update_request(id, &row))
            .await?
            .into_iter()
            .next()
            .map(EntryRow::into_entry)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        tracing::info!(entry_id = %id, "Updated entry");
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> StoreResult<JournalEntry> {
        let removed = self
            .fetch_rows(self.delete_request(id))
            .await?
            .into_iter()
            .next()
            .map(EntryRow::into_entry)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        self.remove_photos(&removed).await;
        tracing::info!(entry_id = %id, "Deleted entry");
        Ok(removed)
    }

    async fn ping(&self) -> StoreResult<()> {
        let request = self
            .rest(Method::GET)
            .query(&[("select", "id"), ("limit", "1")]);
        check_status(request.send().await?).await?;
        Ok(())
    }
}
