//! Library Routes
//!
//! - GET /api/v1/library/poses?q=&search= - Practiced poses with their entries
//! - GET /api/v1/library/sequences?top= - Most frequent pose pairs

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    PoseEntryRef, PoseLibraryItem, PoseLibraryResponse, PoseQuery, SequenceItem,
    SequenceListResponse, SequenceQuery,
};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::library::{filter_poses, mine_frequent_sequences, pose_library};
use crate::search::filter_entries;

/// Upper bound on `top`
const MAX_TOP_SEQUENCES: usize = 50;

/// GET /api/v1/library/poses
pub async fn list_poses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PoseQuery>,
) -> ApiResult<Json<PoseLibraryResponse>> {
    let all = state.store.list().await?;
    let entries: Vec<_> = filter_entries(&all, query.search.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    let library = filter_poses(pose_library(&entries), query.q.as_deref().unwrap_or(""));

    let poses: Vec<PoseLibraryItem> = library
        .into_iter()
        .map(|item| PoseLibraryItem {
            times_practiced: item.times_practiced(),
            pose: item.pose.clone(),
            entries: item
                .entries
                .iter()
                .map(|e| PoseEntryRef {
                    id: e.id.clone(),
                    date: e.date,
                })
                .collect(),
        })
        .collect();

    Ok(Json(PoseLibraryResponse {
        total: poses.len(),
        poses,
    }))
}

/// GET /api/v1/library/sequences
pub async fn frequent_sequences(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SequenceQuery>,
) -> ApiResult<Json<SequenceListResponse>> {
    let top = query
        .top
        .unwrap_or(state.config.top_sequences)
        .min(MAX_TOP_SEQUENCES);

    let entries = state.store.list().await?;
    let sequences = mine_frequent_sequences(&entries, top)
        .into_iter()
        .map(|seq| SequenceItem {
            label: seq.label(),
            count: seq.count,
            poses: seq.poses,
        })
        .collect();

    Ok(Json(SequenceListResponse { sequences }))
}
