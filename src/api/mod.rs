//! Yoga Journal REST API
//!
//! HTTP API layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Entries
//! - `GET /api/v1/entries?q=&favorites=` - List and search entries
//! - `POST /api/v1/entries` - Create an entry
//! - `GET /api/v1/entries/:id` - Get an entry
//! - `PUT /api/v1/entries/:id` - Update an entry
//! - `DELETE /api/v1/entries/:id` - Delete an entry
//! - `POST /api/v1/entries/:id/favorite` - Toggle favorite
//!
//! ## Analytics
//! - `GET /api/v1/analytics/:year/:month` - Monthly KPIs, heatmap, calendar
//! - `GET /api/v1/analytics/:year/:month/days/:day` - Day detail
//!
//! ## Library
//! - `GET /api/v1/library/poses?q=` - Pose library
//! - `GET /api/v1/library/sequences?top=` - Frequent pose sequences
//!
//! ## Backup
//! - `GET /api/v1/backup` - Export
//! - `POST /api/v1/restore` - Merge-restore
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use yoga_journal::api::{serve, ApiConfig, AppState};
//! use yoga_journal::store::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     let state = AppState::new(Arc::new(MemoryStore::new()), config.clone());
//!     serve(state, &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Entry routes
        .route(
            "/entries",
            get(routes::entries::list_entries).post(routes::entries::create_entry),
        )
        .route(
            "/entries/:id",
            get(routes::entries::get_entry)
                .put(routes::entries::update_entry)
                .delete(routes::entries::delete_entry),
        )
        .route("/entries/:id/favorite", post(routes::entries::toggle_favorite))
        // Analytics routes
        .route(
            "/analytics/:year/:month",
            get(routes::analytics::monthly_analytics),
        )
        .route(
            "/analytics/:year/:month/days/:day",
            get(routes::analytics::day_detail),
        )
        // Library routes
        .route("/library/poses", get(routes::library::list_poses))
        .route("/library/sequences", get(routes::library::frequent_sequences))
        // Backup routes
        .route("/backup", get(routes::backup::export_backup))
        .route("/restore", post(routes::backup::restore_backup))
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let backend = state.store.backend_name();
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(backend, "Yoga journal API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Yoga journal API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::{
        DayDetailResponse, EntryListResponse, HealthResponse, MonthlyAnalyticsResponse,
        PoseLibraryResponse, SequenceListResponse,
    };
    use crate::api::error::ErrorResponse;
    use crate::journal::{JournalEntry, NewEntry, YogaPose};
    use crate::store::{MemoryStore, RestoreReport, SqliteStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::{FixedOffset, TimeZone};
    use serde::de::DeserializeOwned;
    use tower::util::ServiceExt;

    fn august(day: u32) -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 8, day, 7, 0, 0)
            .unwrap()
    }

    fn seeded_entries() -> Vec<JournalEntry> {
        let sun = YogaPose::new("Downward Dog", "Adho Mukha Svanasana");
        let cobra = YogaPose::new("Cobra", "Bhujangasana");
        vec![
            NewEntry::new("morning flow")
                .date(august(1))
                .duration("60분")
                .hashtag("빈야사")
                .pose(sun.clone())
                .pose(cobra.clone())
                .into_entry("e1")
                .unwrap(),
            NewEntry::new("short stretch")
                .date(august(3))
                .duration("45분")
                .favorite(true)
                .pose(sun)
                .pose(cobra)
                .into_entry("e2")
                .unwrap(),
            NewEntry::new("yin")
                .date(august(5))
                .duration("30분")
                .into_entry("e3")
                .unwrap(),
        ]
    }

    fn create_test_app() -> Router {
        let store = Arc::new(MemoryStore::with_entries(seeded_entries()));
        build_router(AppState::new(store, ApiConfig::default()))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn send_json(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_test_app();

        for uri in ["/health/live", "/health/ready"] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = read_json(response).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.backend, "memory");
    }

    #[tokio::test]
    async fn test_create_entry() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/v1/entries",
                r#"{"notes": "evening", "duration": "20분", "hashtags": "회복, 저녁", "intensity": 2}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created: JournalEntry = read_json(response).await;
        assert_eq!(created.hashtags(), ["회복".to_string(), "저녁".to_string()]);

        let response = app
            .oneshot(get(&format!("/api/v1/entries/{}", created.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_invalid_entry() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(send_json("POST", "/api/v1/entries", r#"{"notes": "  "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.error.code, "VALIDATION_ERROR");
        assert!(!error.request_id.is_empty());

        let response = app
            .oneshot(send_json("POST", "/api/v1/entries", "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_with_query_and_favorites() {
        let app = create_test_app();

        let response = app.clone().oneshot(get("/api/v1/entries")).await.unwrap();
        let list: EntryListResponse = read_json(response).await;
        let ids: Vec<&str> = list.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e3", "e2", "e1"]);

        let response = app
            .clone()
            .oneshot(get("/api/v1/entries?q=%EB%B9%88%EC%95%BC"))
            .await
            .unwrap();
        let list: EntryListResponse = read_json(response).await;
        assert_eq!(list.total, 1);
        assert_eq!(list.entries[0].id, "e1");

        let response = app
            .clone()
            .oneshot(get("/api/v1/entries?q=COBRA&favorites=true"))
            .await
            .unwrap();
        let list: EntryListResponse = read_json(response).await;
        assert_eq!(list.total, 1);
        assert_eq!(list.entries[0].id, "e2");
    }

    #[tokio::test]
    async fn test_unknown_entry_is_404() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(get("/api/v1/entries/missing"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(send_json(
                "PUT",
                "/api/v1/entries/missing",
                r#"{"notes": "x"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/entries/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_toggle_and_delete() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(send_json("PUT", "/api/v1/entries/e3", r#"{"duration": "50분"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated: JournalEntry = read_json(response).await;
        assert_eq!(updated.duration_minutes(), 50);
        assert_eq!(updated.notes, "yin");

        let response = app
            .clone()
            .oneshot(send_json("PUT", "/api/v1/entries/e3", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(send_json("POST", "/api/v1/entries/e3/favorite", ""))
            .await
            .unwrap();
        let toggled: JournalEntry = read_json(response).await;
        assert!(toggled.is_favorite());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/entries/e3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get("/api/v1/entries/e3")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_monthly_analytics() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(get("/api/v1/analytics/2024/8"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stats: MonthlyAnalyticsResponse = read_json(response).await;
        assert_eq!(stats.month, "2024-08");
        assert_eq!(stats.previous_month, "2024-07");
        assert_eq!(stats.next_month, "2024-09");
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_minutes, 135);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.heatmap.len(), 31);
        assert_eq!(stats.heatmap[0].level, 3);
        assert_eq!(stats.calendar.len(), 4 + 31);

        let response = app
            .oneshot(get("/api/v1/analytics/2024/13"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analytics_for_last_calendar_month() {
        let app = create_test_app();

        let response = app
            .oneshot(get("/api/v1/analytics/262142/12"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stats: MonthlyAnalyticsResponse = read_json(response).await;
        assert_eq!(stats.heatmap.len(), 31);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.calendar.iter().flatten().count(), 31);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_or_repeated_pose() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/v1/entries",
                r#"{"notes": "flow", "poses": [{"name": " "}]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(send_json(
                "POST",
                "/api/v1/entries",
                r#"{"notes": "flow", "poses": [{"name": "Crow"}, {"name": "Crow"}]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = read_json(response).await;
        assert!(body.error.message.contains("Crow"));
    }

    #[tokio::test]
    async fn test_day_detail() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(get("/api/v1/analytics/2024/8/days/3"))
            .await
            .unwrap();
        let detail: DayDetailResponse = read_json(response).await;
        assert_eq!(detail.date, "2024-08-03");
        assert_eq!(detail.total_minutes, 45);
        assert_eq!(detail.entries.len(), 1);

        let response = app
            .clone()
            .oneshot(get("/api/v1/analytics/2024/8/days/2"))
            .await
            .unwrap();
        let detail: DayDetailResponse = read_json(response).await;
        assert!(detail.entries.is_empty());

        let response = app
            .oneshot(get("/api/v1/analytics/2024/2/days/30"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_library_endpoints() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(get("/api/v1/library/poses?q=svana"))
            .await
            .unwrap();
        let library: PoseLibraryResponse = read_json(response).await;
        assert_eq!(library.total, 1);
        assert_eq!(library.poses[0].pose.name, "Downward Dog");
        assert_eq!(library.poses[0].times_practiced, 2);

        let response = app
            .clone()
            .oneshot(get("/api/v1/library/poses?search=stretch"))
            .await
            .unwrap();
        let library: PoseLibraryResponse = read_json(response).await;
        assert_eq!(library.total, 2);
        assert!(library.poses.iter().all(|item| item.times_practiced == 1));
        assert_eq!(library.poses[0].entries[0].id, "e2");

        let response = app
            .clone()
            .oneshot(get("/api/v1/library/poses?search=yin"))
            .await
            .unwrap();
        let library: PoseLibraryResponse = read_json(response).await;
        assert_eq!(library.total, 0);

        let response = app
            .oneshot(get("/api/v1/library/sequences"))
            .await
            .unwrap();
        let sequences: SequenceListResponse = read_json(response).await;
        assert_eq!(sequences.sequences.len(), 1);
        assert_eq!(sequences.sequences[0].label, "Downward Dog → Cobra");
        assert_eq!(sequences.sequences[0].count, 2);
    }

    #[tokio::test]
    async fn test_backup_and_restore() {
        let app = create_test_app();

        let response = app.clone().oneshot(get("/api/v1/backup")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(axum::http::header::CONTENT_DISPOSITION));
        let backup: crate::store::Backup = read_json(response).await;
        assert_eq!(backup.entries.len(), 3);

        let extra = NewEntry::new("restored")
            .date(august(20))
            .into_entry("e9")
            .unwrap();
        let mut document = backup.entries.clone();
        document.push(extra);
        let body = serde_json::to_string(&document).unwrap();

        let response = app
            .clone()
            .oneshot(send_json("POST", "/api/v1/restore", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report: RestoreReport = read_json(response).await;
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped.len(), 3);

        let legacy = r#"[{"id": "1722470400000", "date": "2024-08-01T00:00:00.000Z",
            "photos": [], "notes": "old flow", "hashtags": [], "poses": [],
            "duration": "", "intensity": 0}]"#;
        let response = app
            .clone()
            .oneshot(send_json("POST", "/api/v1/restore", legacy))
            .await
            .unwrap();
        let report: RestoreReport = read_json(response).await;
        assert_eq!(report.inserted, 1);
        assert!(report.rejected.is_empty());

        let response = app
            .oneshot(send_json("POST", "/api/v1/restore", "{\"nope\": 1}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sqlite_backed_router() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::open(dir.path()).unwrap());
        let app = build_router(AppState::new(store, ApiConfig::default()));

        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/v1/entries",
                r#"{"notes": "persisted", "date": "2024-08-10T07:00:00+09:00", "duration": "25분"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(get("/api/v1/analytics/2024/8"))
            .await
            .unwrap();
        let stats: MonthlyAnalyticsResponse = read_json(response).await;
        assert_eq!(stats.total_minutes, 25);
        assert_eq!(stats.heatmap[9].tier, crate::analytics::HeatmapTier::Medium);
    }
}
