//! Analytics Routes
//!
//! Monthly dashboard endpoints.
//!
//! - GET /api/v1/analytics/:year/:month - KPIs, heatmap and calendar grid
//! - GET /api/v1/analytics/:year/:month/days/:day - Entries for one day

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::analytics::{aggregate_month, calendar_grid, HeatmapTier, ViewMonth};
use crate::api::dto::{DayDetailResponse, DayHeatDto, MonthlyAnalyticsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/v1/analytics/:year/:month
pub async fn monthly_analytics(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Json<MonthlyAnalyticsResponse>> {
    let month = ViewMonth::new(year, month)?;
    let entries = state.store.list().await?;
    let stats = aggregate_month(&entries, month);

    Ok(Json(MonthlyAnalyticsResponse {
        month: month.to_string(),
        previous_month: month.previous().to_string(),
        next_month: month.next().to_string(),
        total_minutes: stats.total_minutes,
        total_sessions: stats.total_sessions,
        longest_streak: stats.longest_streak,
        heatmap: stats.heatmap().into_iter().map(DayHeatDto::from).collect(),
        calendar: calendar_grid(month),
    }))
}

/// GET /api/v1/analytics/:year/:month/days/:day
pub async fn day_detail(
    State(state): State<Arc<AppState>>,
    Path((year, month, day)): Path<(i32, u32, u32)>,
) -> ApiResult<Json<DayDetailResponse>> {
    let month = ViewMonth::new(year, month)?;
    if day == 0 || day > month.days_in_month() {
        return Err(ApiError::Validation(format!(
            "{} has no day {}",
            month, day
        )));
    }

    let entries = state.store.list().await?;
    let stats = aggregate_month(&entries, month);

    let response = match stats.day_detail(day) {
        Some(bucket) => DayDetailResponse {
            date: format!("{}-{:02}", month, day),
            total_minutes: bucket.total_minutes,
            tier: HeatmapTier::for_minutes(bucket.total_minutes),
            entries: bucket.entries.iter().map(|e| (*e).clone()).collect(),
        },
        None => DayDetailResponse::empty(month, day),
    };

    Ok(Json(response))
}
