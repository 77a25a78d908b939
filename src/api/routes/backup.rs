//! Backup Routes
//!
//! - GET /api/v1/backup - Download every entry as a backup document
//! - POST /api/v1/restore - Merge a backup into the journal

use axum::{extract::State, http::header, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::store::{restore_entries, Backup, RestoreReport};

/// GET /api/v1/backup
pub async fn export_backup(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let backup = Backup::from_entries(state.store.list().await?);
    let filename = format!(
        "attachment; filename=\"yoga-journal-{}.json\"",
        backup.exported_at.format("%Y-%m-%d")
    );

    tracing::info!(entries = backup.entries.len(), "Exported backup");
    Ok(([(header::CONTENT_DISPOSITION, filename)], Json(backup)))
}

/// POST /api/v1/restore
///
/// Accepts a versioned backup or a bare array of entries.
pub async fn restore_backup(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<RestoreReport>> {
    let backup =
        Backup::parse(&body).map_err(|e| ApiError::Validation(format!("Invalid backup: {}", e)))?;

    let report = restore_entries(state.store.as_ref(), backup.entries).await?;
    Ok(Json(report))
}
