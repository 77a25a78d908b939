//! Entry Routes
//!
//! CRUD endpoints for journal entries.
//!
//! - GET /api/v1/entries?q=&favorites= - List entries, newest first
//! - POST /api/v1/entries - Create an entry
//! - GET /api/v1/entries/:id - Get one entry
//! - PUT /api/v1/entries/:id - Partially update an entry
//! - DELETE /api/v1/entries/:id - Delete an entry
//! - POST /api/v1/entries/:id/favorite - Toggle the favorite flag

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CreateEntryRequest, EntryListQuery, EntryListResponse, UpdateEntryRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::journal::{EntryPatch, JournalEntry, NewEntry};
use crate::search::{favorites_only, filter_entries};

/// GET /api/v1/entries
///
/// Search and favorites filters compose; both keep newest-first order.
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EntryListQuery>,
) -> ApiResult<Json<EntryListResponse>> {
    let all = state.store.list().await?;

    let matched = filter_entries(&all, query.q.as_deref().unwrap_or(""));
    let matched = if query.favorites.unwrap_or(false) {
        favorites_only(matched)
    } else {
        matched
    };

    let entries: Vec<JournalEntry> = matched.into_iter().cloned().collect();
    Ok(Json(EntryListResponse {
        total: entries.len(),
        entries,
    }))
}

/// GET /api/v1/entries/:id
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<JournalEntry>> {
    let entry = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Entry {} not found", id)))?;

    Ok(Json(entry))
}

/// POST /api/v1/entries
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<JournalEntry>)> {
    let entry = state.store.insert(NewEntry::from(req)).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/v1/entries/:id
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEntryRequest>,
) -> ApiResult<Json<JournalEntry>> {
    let patch = EntryPatch::from(req);
    if patch.is_empty() {
        return Err(ApiError::Validation("Update contains no fields".to_string()));
    }

    let entry = state.store.update(&id, patch).await?;
    Ok(Json(entry))
}

/// DELETE /api/v1/entries/:id
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/entries/:id/favorite
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<JournalEntry>> {
    let entry = state.store.toggle_favorite(&id).await?;
    Ok(Json(entry))
}
